//! `rel="related"` links to entities referenced by the subject

use crate::core::auth::AuthContext;
use crate::core::entity::{ContentEntity, EntityLoader};
use crate::core::field::FieldDefinitionProvider;
use crate::core::service::{AccessChecker, UrlGenerator};
use crate::links::header::LinkHeaderValue;
use anyhow::Result;
use std::sync::Arc;

/// Emits one link per viewable entity referenced by a bundle-configured
/// entity reference field
///
/// Links are ordered by field, then by stored reference order. The field
/// label is used as the title; nothing is deduplicated, so an entity
/// referenced by two fields appears twice with two titles. References to
/// entities that no longer exist are skipped.
#[derive(Clone)]
pub struct ReferenceLinkGenerator {
    entities: Arc<dyn EntityLoader>,
    fields: Arc<dyn FieldDefinitionProvider>,
    access: Arc<dyn AccessChecker>,
    urls: Arc<dyn UrlGenerator>,
}

impl ReferenceLinkGenerator {
    pub fn new(
        entities: Arc<dyn EntityLoader>,
        fields: Arc<dyn FieldDefinitionProvider>,
        access: Arc<dyn AccessChecker>,
        urls: Arc<dyn UrlGenerator>,
    ) -> Self {
        Self {
            entities,
            fields,
            access,
            urls,
        }
    }

    /// Build the related links of an entity for the acting user
    pub async fn generate(
        &self,
        entity: &dyn ContentEntity,
        user: &AuthContext,
    ) -> Result<Vec<LinkHeaderValue>> {
        let definitions = self
            .fields
            .field_definitions(entity.entity_type(), entity.bundle())
            .await?;

        let mut links = Vec::new();
        for field in definitions.iter().filter(|field| field.is_link_source()) {
            for target in entity.referenced_entities(&field.name) {
                let loaded = self.entities.load(&target.entity_type, &target.id).await?;
                if loaded.is_none() {
                    tracing::trace!(
                        field = %field.name,
                        entity_type = %target.entity_type,
                        entity_id = %target.id,
                        "Dangling reference, no link"
                    );
                    continue;
                }
                if !self.access.can_view(&target, user).await? {
                    tracing::trace!(
                        field = %field.name,
                        entity_type = %target.entity_type,
                        entity_id = %target.id,
                        "Referenced entity not viewable, no link"
                    );
                    continue;
                }
                let url = self.urls.entity_url(&target)?;
                links.push(LinkHeaderValue::related(url, field.label.as_str()));
            }
        }

        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::AuthPolicy;
    use crate::core::entity::EntityReference;
    use crate::core::field::FieldDefinition;
    use crate::server::access::PolicyAccessChecker;
    use crate::server::registry::{RouteDefinition, RouteRegistry};
    use crate::server::url::RouteUrlGenerator;
    use crate::storage::{InMemoryEntityStore, InMemoryFieldDefinitions, StoredEntity};
    use uuid::Uuid;

    fn registry() -> Arc<RouteRegistry> {
        Arc::new(
            RouteRegistry::from_routes([
                RouteDefinition::get("entity.user.canonical", "/user/{user}")
                    .with_entity_parameter("user", "user"),
                RouteDefinition::get(
                    "entity.taxonomy_term.canonical",
                    "/taxonomy/term/{taxonomy_term}",
                )
                .with_entity_parameter("taxonomy_term", "taxonomy_term"),
                RouteDefinition::get("entity.media.canonical", "/media/{media}")
                    .with_entity_parameter("media", "media"),
            ])
            .unwrap(),
        )
    }

    fn urls() -> Arc<RouteUrlGenerator> {
        Arc::new(RouteUrlGenerator::new("https://example.org", registry()).unwrap())
    }

    /// Store holding every entity the article refers to
    fn store() -> InMemoryEntityStore {
        let store = InMemoryEntityStore::new();
        for (entity_type, bundle, id) in [
            ("user", "user", "1"),
            ("user", "user", "5"),
            ("taxonomy_term", "tags", "3"),
            ("taxonomy_term", "tags", "4"),
            ("taxonomy_term", "tags", "5"),
            ("media", "image", "9"),
        ] {
            store
                .insert(StoredEntity::new(entity_type, bundle, id))
                .unwrap();
        }
        store
    }

    fn article_fields() -> InMemoryFieldDefinitions {
        InMemoryFieldDefinitions::new()
            .with_field(
                "node",
                "article",
                FieldDefinition::entity_reference("uid", "Authored by").into_base_field(),
            )
            .with_field("node", "article", FieldDefinition::new("body", "text_long", "Body"))
            .with_field(
                "node",
                "article",
                FieldDefinition::entity_reference("field_tags", "Tags"),
            )
            .with_field(
                "node",
                "article",
                FieldDefinition::entity_reference("field_image", "Image"),
            )
    }

    fn generator_for(
        store: InMemoryEntityStore,
        access: PolicyAccessChecker,
    ) -> ReferenceLinkGenerator {
        ReferenceLinkGenerator::new(
            Arc::new(store),
            Arc::new(article_fields()),
            Arc::new(access),
            urls(),
        )
    }

    fn generator(access: PolicyAccessChecker) -> ReferenceLinkGenerator {
        generator_for(store(), access)
    }

    fn article() -> StoredEntity {
        StoredEntity::new("node", "article", "1")
            .with_reference("uid", EntityReference::new("user", "1"))
            .with_reference("field_tags", EntityReference::new("taxonomy_term", "3"))
            .with_reference("field_tags", EntityReference::new("taxonomy_term", "4"))
            .with_reference("field_tags", EntityReference::new("taxonomy_term", "5"))
            .with_reference("field_image", EntityReference::new("media", "9"))
    }

    #[tokio::test]
    async fn test_one_link_per_reference_in_field_order() {
        let links = generator(PolicyAccessChecker::default())
            .generate(&article(), &AuthContext::Anonymous)
            .await
            .unwrap();

        let rendered: Vec<String> = links.iter().map(|l| l.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                r#"<https://example.org/taxonomy/term/3>; rel="related"; title="Tags""#,
                r#"<https://example.org/taxonomy/term/4>; rel="related"; title="Tags""#,
                r#"<https://example.org/taxonomy/term/5>; rel="related"; title="Tags""#,
                r#"<https://example.org/media/9>; rel="related"; title="Image""#,
            ]
        );
    }

    #[tokio::test]
    async fn test_base_fields_are_ignored() {
        let links = generator(PolicyAccessChecker::default())
            .generate(&article(), &AuthContext::Anonymous)
            .await
            .unwrap();
        assert!(links.iter().all(|l| l.title.as_deref() != Some("Authored by")));
    }

    #[tokio::test]
    async fn test_inaccessible_entities_are_excluded() {
        let access = PolicyAccessChecker::default()
            .with_entity_policy("media", AuthPolicy::Authenticated);
        let anonymous_links = generator(access)
            .generate(&article(), &AuthContext::Anonymous)
            .await
            .unwrap();
        assert_eq!(anonymous_links.len(), 3);
        assert!(anonymous_links.iter().all(|l| !l.url.contains("/media/")));

        let access = PolicyAccessChecker::default()
            .with_entity_policy("media", AuthPolicy::Authenticated);
        let user = AuthContext::User {
            user_id: Uuid::new_v4(),
            roles: vec![],
        };
        let user_links = generator(access).generate(&article(), &user).await.unwrap();
        assert_eq!(user_links.len(), 4);
    }

    #[tokio::test]
    async fn test_all_denied_yields_nothing() {
        let links = generator(PolicyAccessChecker::new(AuthPolicy::Deny))
            .generate(&article(), &AuthContext::Anonymous)
            .await
            .unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_removed_target_yields_no_link() {
        let store = store();
        store.remove("taxonomy_term", "4").unwrap();
        store.remove("media", "9").unwrap();

        let links = generator_for(store, PolicyAccessChecker::default())
            .generate(&article(), &AuthContext::Anonymous)
            .await
            .unwrap();

        assert_eq!(
            links,
            vec![
                LinkHeaderValue::related("https://example.org/taxonomy/term/3", "Tags"),
                LinkHeaderValue::related("https://example.org/taxonomy/term/5", "Tags"),
            ]
        );
    }

    #[tokio::test]
    async fn test_deleted_author_is_not_advertised() {
        let store = store();
        let fields = InMemoryFieldDefinitions::new().with_field(
            "node",
            "page",
            FieldDefinition::entity_reference("field_author", "Author"),
        );
        let generator = ReferenceLinkGenerator::new(
            Arc::new(store.clone()),
            Arc::new(fields),
            Arc::new(PolicyAccessChecker::default()),
            urls(),
        );
        let page = StoredEntity::new("node", "page", "2")
            .with_reference("field_author", EntityReference::new("user", "5"));

        let before = generator.generate(&page, &AuthContext::Anonymous).await.unwrap();
        assert_eq!(before.len(), 1);

        assert!(store.remove("user", "5").unwrap());
        let after = generator.generate(&page, &AuthContext::Anonymous).await.unwrap();
        assert!(after.is_empty());
    }

    #[tokio::test]
    async fn test_entity_referenced_by_two_fields_is_not_merged() {
        let fields = InMemoryFieldDefinitions::new()
            .with_field(
                "node",
                "page",
                FieldDefinition::entity_reference("field_owner", "Owner"),
            )
            .with_field(
                "node",
                "page",
                FieldDefinition::entity_reference("field_editor", "Editor"),
            );
        let generator = ReferenceLinkGenerator::new(
            Arc::new(store()),
            Arc::new(fields),
            Arc::new(PolicyAccessChecker::default()),
            urls(),
        );
        let page = StoredEntity::new("node", "page", "2")
            .with_reference("field_owner", EntityReference::new("user", "5"))
            .with_reference("field_editor", EntityReference::new("user", "5"));

        let links = generator.generate(&page, &AuthContext::Anonymous).await.unwrap();
        assert_eq!(
            links,
            vec![
                LinkHeaderValue::related("https://example.org/user/5", "Owner"),
                LinkHeaderValue::related("https://example.org/user/5", "Editor"),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_bundle_or_empty_fields() {
        let generator = generator(PolicyAccessChecker::default());
        let page = StoredEntity::new("node", "page", "2");
        assert!(
            generator
                .generate(&page, &AuthContext::Anonymous)
                .await
                .unwrap()
                .is_empty()
        );

        let bare_article = StoredEntity::new("node", "article", "3");
        assert!(
            generator
                .generate(&bare_article, &AuthContext::Anonymous)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_url_failure_propagates() {
        // Existing entity whose type has no canonical route
        let store = store();
        store.insert(StoredEntity::new("comment", "comment", "8")).unwrap();
        let article = StoredEntity::new("node", "article", "1")
            .with_reference("field_tags", EntityReference::new("comment", "8"));

        let result = generator_for(store, PolicyAccessChecker::default())
            .generate(&article, &AuthContext::Anonymous)
            .await;
        assert!(result.is_err());
    }
}
