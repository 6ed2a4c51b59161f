use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use publications_common::{Publication, PublicationId, PublicationStatus};

use crate::domain::repository::{
    NewPublication, PageRequest, PublicationChanges, PublicationFilter, PublicationPage,
    PublicationRepository, RepositoryError, StatusCount,
};

/// In-memory publication store.
///
/// Stands in for the external persistence collaborator: plain records keyed
/// by id, monotonic id allocation, timestamps maintained here. Offers no
/// cross-request locking discipline beyond the map lock itself.
#[derive(Clone, Default)]
pub struct InMemoryPublicationRepository {
    inner: Arc<RwLock<Store>>,
}

#[derive(Default)]
struct Store {
    rows: HashMap<i64, Publication>,
    next_id: i64,
}

impl Store {
    fn allocate_id(&mut self) -> PublicationId {
        self.next_id += 1;
        PublicationId(self.next_id)
    }
}

impl PublicationRepository for InMemoryPublicationRepository {
    async fn create(&self, new: NewPublication) -> Result<Publication, RepositoryError> {
        let mut store = self.inner.write().await;
        let id = store.allocate_id();
        let now = Utc::now();

        let publication = Publication {
            id,
            title: new.title,
            description: new.description,
            author_id: new.author_id,
            status: new.status,
            review_comments: new.review_comments,
            published_date: None,
            created_at: now,
            updated_at: now,
        };

        store.rows.insert(id.0, publication.clone());
        Ok(publication)
    }

    async fn find_by_id(&self, id: PublicationId) -> Result<Option<Publication>, RepositoryError> {
        let store = self.inner.read().await;
        Ok(store.rows.get(&id.0).cloned())
    }

    async fn list(
        &self,
        filter: PublicationFilter,
        page: PageRequest,
    ) -> Result<PublicationPage, RepositoryError> {
        let store = self.inner.read().await;

        let mut matching: Vec<&Publication> = store
            .rows
            .values()
            .filter(|row| filter.status.is_none_or(|status| row.status == status))
            .filter(|row| filter.author_id.is_none_or(|author| row.author_id == author))
            .collect();
        // newest first; id breaks ties between same-instant inserts
        matching.sort_by(|a, b| (b.created_at, b.id.0).cmp(&(a.created_at, a.id.0)));

        let total = matching.len() as i64;
        let publications = matching
            .into_iter()
            .skip(page.offset().max(0) as usize)
            .take(page.limit.max(0) as usize)
            .cloned()
            .collect();

        Ok(PublicationPage {
            total,
            page: page.page,
            pages: pages_for(total, page.limit),
            publications,
        })
    }

    async fn update(
        &self,
        id: PublicationId,
        changes: PublicationChanges,
    ) -> Result<Publication, RepositoryError> {
        let mut store = self.inner.write().await;
        let row = store.rows.get_mut(&id.0).ok_or(RepositoryError::NotFound)?;

        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(description) = changes.description {
            row.description = description;
        }
        if let Some(author_id) = changes.author_id {
            row.author_id = author_id;
        }
        if let Some(review_comments) = changes.review_comments {
            row.review_comments = Some(review_comments);
        }
        if let Some(status) = changes.status {
            row.status = status;
        }
        if let Some(published_date) = changes.published_date {
            row.published_date = Some(published_date);
        }
        row.updated_at = Utc::now();

        Ok(row.clone())
    }

    async fn delete(&self, id: PublicationId) -> Result<(), RepositoryError> {
        let mut store = self.inner.write().await;
        store.rows.remove(&id.0).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    async fn count_by_status(&self) -> Result<Vec<StatusCount>, RepositoryError> {
        use itertools::Itertools;

        let store = self.inner.read().await;
        let counts = store.rows.values().counts_by(|row| row.status);

        Ok(PublicationStatus::ALL
            .into_iter()
            .filter_map(|status| {
                counts
                    .get(&status)
                    .map(|count| StatusCount { status, count: *count as i64 })
            })
            .collect())
    }
}

fn pages_for(total: i64, limit: i64) -> i64 {
    if limit <= 0 { 0 } else { (total + limit - 1) / limit }
}

#[cfg(test)]
mod tests {
    use publications_common::{
        AuthorId, PublicationDescription, PublicationTitle,
    };

    use super::*;

    fn new_publication(author: i64) -> NewPublication {
        NewPublication {
            title: PublicationTitle::try_new("A title").unwrap(),
            description: PublicationDescription::try_new("A long enough description").unwrap(),
            author_id: AuthorId::try_new(author).unwrap(),
            status: PublicationStatus::Draft,
            review_comments: None,
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_monotonically() {
        let repo = InMemoryPublicationRepository::default();
        let first = repo.create(new_publication(1)).await.unwrap();
        let second = repo.create(new_publication(1)).await.unwrap();
        assert!(second.id.0 > first.id.0);
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let repo = InMemoryPublicationRepository::default();
        for author in [1, 1, 2] {
            repo.create(new_publication(author)).await.unwrap();
        }

        let by_author = repo
            .list(
                PublicationFilter {
                    author_id: Some(AuthorId::try_new(1).unwrap()),
                    ..Default::default()
                },
                PageRequest { page: 1, limit: 10 },
            )
            .await
            .unwrap();
        assert_eq!(by_author.total, 2);

        let paged = repo
            .list(PublicationFilter::default(), PageRequest { page: 2, limit: 2 })
            .await
            .unwrap();
        assert_eq!(paged.total, 3);
        assert_eq!(paged.pages, 2);
        assert_eq!(paged.publications.len(), 1);
    }

    #[tokio::test]
    async fn partial_update_leaves_other_fields_alone() {
        let repo = InMemoryPublicationRepository::default();
        let created = repo.create(new_publication(1)).await.unwrap();

        let updated = repo
            .update(
                created.id,
                PublicationChanges {
                    review_comments: Some("looks good".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, created.title);
        assert_eq!(updated.review_comments.as_deref(), Some("looks good"));
        assert_eq!(updated.published_date, None);
    }

    #[tokio::test]
    async fn delete_of_missing_row_reports_not_found() {
        let repo = InMemoryPublicationRepository::default();
        assert!(matches!(
            repo.delete(PublicationId(42)).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
