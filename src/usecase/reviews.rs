use crate::domain::review::{is_valid_rating, Review, MAX_RATING};
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::ListRepository;
use crate::usecase::error::UsecaseError;
use crate::usecase::lists::{list_not_found, map_list_error};

/// A review together with the list it belongs to and its position there.
#[derive(Debug, Clone)]
pub struct ReviewEntry {
    pub list_name: String,
    pub index: usize,
    pub review: Review,
}

pub struct ReviewsUseCase<L>
where
    L: ListRepository,
{
    list_repository: L,
}

impl<L> ReviewsUseCase<L>
where
    L: ListRepository,
{
    pub fn new(list_repository: L) -> Self {
        Self { list_repository }
    }

    /// Validates and appends a review, returning it with the list's new average.
    #[tracing::instrument(skip(self, comment))]
    pub async fn add_review(
        &self,
        list_name: &str,
        author_name: &str,
        rating: f64,
        comment: Option<String>,
    ) -> Result<(Review, f64), UsecaseError> {
        tracing::debug!("adding review");

        if !is_valid_rating(rating) {
            return Err(UsecaseError::Validation(format!(
                "Rating must be a number between 0 and {MAX_RATING}."
            )));
        }

        let comment = comment.unwrap_or_default();
        if comment.trim().is_empty() {
            return Err(UsecaseError::Validation(
                "Comment must be a non-empty string.".to_string(),
            ));
        }

        self.list_repository
            .find_by_name(list_name)
            .await?
            .ok_or_else(|| list_not_found(list_name))?;

        let review = Review::new(rating, comment, author_name.to_string());
        let average = self
            .list_repository
            .append_review(list_name, &review)
            .await
            .map_err(map_list_error(list_name))?;

        metrics::counter!("list_reviews_total").increment(1);
        tracing::info!(list_name, review_id = %review.id, average, "review added successfully");
        Ok((review, average))
    }

    /// Reviews that moderation has not hidden, in insertion order.
    #[tracing::instrument(skip(self))]
    pub async fn list_reviews(&self, list_name: &str) -> Result<Vec<Review>, UsecaseError> {
        tracing::debug!("listing visible reviews");

        let list = self
            .list_repository
            .find_by_name(list_name)
            .await?
            .ok_or_else(|| list_not_found(list_name))?;

        let reviews: Vec<Review> = list.visible_reviews().into_iter().cloned().collect();

        tracing::debug!(list_name, count = reviews.len(), "retrieved visible reviews");
        Ok(reviews)
    }

    /// Every review of every list, hidden ones included.
    #[tracing::instrument(skip(self))]
    pub async fn all_reviews(&self) -> Result<Vec<ReviewEntry>, UsecaseError> {
        tracing::debug!("listing all reviews");

        let entries: Vec<ReviewEntry> = self
            .list_repository
            .find_all()
            .await?
            .into_iter()
            .flat_map(|list| {
                let list_name = list.name;
                list.reviews
                    .into_iter()
                    .enumerate()
                    .map(move |(index, review)| ReviewEntry {
                        list_name: list_name.clone(),
                        index,
                        review,
                    })
            })
            .collect();

        tracing::debug!(count = entries.len(), "retrieved all reviews");
        Ok(entries)
    }

    /// Hides or shows one review; rating, text and the list average stay as they are.
    #[tracing::instrument(skip(self))]
    pub async fn set_review_visibility(
        &self,
        list_name: &str,
        index: usize,
        visible: bool,
    ) -> Result<(), UsecaseError> {
        tracing::debug!("setting review visibility");

        let list = self
            .list_repository
            .find_by_name(list_name)
            .await?
            .ok_or_else(|| list_not_found(list_name))?;

        if index >= list.reviews.len() {
            return Err(UsecaseError::NotFound("Review".to_string()));
        }

        self.list_repository
            .set_review_visibility(list_name, index, visible)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => UsecaseError::NotFound("Review".to_string()),
                other => other.into(),
            })?;

        tracing::info!(list_name, index, visible, "review visibility updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::list::TravelList;
    use crate::usecase::contracts::MockListRepository;
    use crate::usecase::lists::make_list;

    fn reviewed_list(ratings: &[f64]) -> TravelList {
        let mut list = make_list("Trip", "owner@example.com");
        for &rating in ratings {
            list.add_review(Review::new(rating, "ok".to_string(), "someone".to_string()));
        }
        list
    }

    #[tokio::test]
    async fn test_add_review_success() {
        let mut mock_repo = MockListRepository::new();
        let list = reviewed_list(&[5.0, 3.0]);

        mock_repo
            .expect_find_by_name()
            .times(1)
            .returning(move |_| Ok(Some(list.clone())));
        mock_repo
            .expect_append_review()
            .withf(|name, review| {
                name == "Trip" && review.rating == 4.0 && review.is_visible && review.author_name == "tester"
            })
            .times(1)
            .returning(|_, _| Ok(4.0));

        let usecase = ReviewsUseCase::new(mock_repo);
        let (review, average) = usecase
            .add_review("Trip", "tester", 4.0, Some("Lovely".to_string()))
            .await
            .unwrap();

        assert_eq!(review.comment, "Lovely");
        assert_eq!(average, 4.0);
    }

    #[tokio::test]
    async fn test_add_review_accepts_zero_rating() {
        let mut mock_repo = MockListRepository::new();
        let list = reviewed_list(&[]);

        mock_repo
            .expect_find_by_name()
            .returning(move |_| Ok(Some(list.clone())));
        mock_repo
            .expect_append_review()
            .returning(|_, _| Ok(0.0));

        let usecase = ReviewsUseCase::new(mock_repo);
        let result = usecase
            .add_review("Trip", "tester", 0.0, Some("Meh".to_string()))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_add_review_accepts_fractional_rating() {
        let mut mock_repo = MockListRepository::new();
        let list = reviewed_list(&[4.0]);

        mock_repo
            .expect_find_by_name()
            .returning(move |_| Ok(Some(list.clone())));
        mock_repo
            .expect_append_review()
            .withf(|_, review| review.rating == 4.5)
            .times(1)
            .returning(|_, _| Ok(4.3));

        let usecase = ReviewsUseCase::new(mock_repo);
        let (review, average) = usecase
            .add_review("Trip", "tester", 4.5, Some("Almost perfect".to_string()))
            .await
            .unwrap();

        assert_eq!(review.rating, 4.5);
        assert_eq!(average, 4.3);
    }

    #[tokio::test]
    async fn test_add_review_invalid_rating() {
        for rating in [-0.5, 5.1, 6.0, f64::NAN, f64::INFINITY] {
            let mock_repo = MockListRepository::new();
            let usecase = ReviewsUseCase::new(mock_repo);

            let result = usecase
                .add_review("Trip", "tester", rating, Some("text".to_string()))
                .await;

            assert!(matches!(result, Err(UsecaseError::Validation(_))), "rating {rating}");
        }
    }

    #[tokio::test]
    async fn test_add_review_blank_comment() {
        for comment in [None, Some(String::new()), Some("   ".to_string())] {
            let mock_repo = MockListRepository::new();
            let usecase = ReviewsUseCase::new(mock_repo);

            let result = usecase.add_review("Trip", "tester", 3.0, comment).await;

            assert!(matches!(result, Err(UsecaseError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_add_review_missing_list() {
        let mut mock_repo = MockListRepository::new();
        mock_repo.expect_find_by_name().returning(|_| Ok(None));
        mock_repo.expect_append_review().times(0);

        let usecase = ReviewsUseCase::new(mock_repo);
        let result = usecase
            .add_review("Ghost", "tester", 3.0, Some("text".to_string()))
            .await;

        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_review_storage_failure_is_internal() {
        let mut mock_repo = MockListRepository::new();
        let list = reviewed_list(&[]);

        mock_repo
            .expect_find_by_name()
            .returning(move |_| Ok(Some(list.clone())));
        mock_repo
            .expect_append_review()
            .times(1)
            .returning(|_, _| Err(RepositoryError::DatabaseError("connection reset".to_string())));

        let usecase = ReviewsUseCase::new(mock_repo);
        let result = usecase
            .add_review("Trip", "tester", 3.0, Some("text".to_string()))
            .await;

        assert!(matches!(result, Err(UsecaseError::Internal(_))));
    }

    #[tokio::test]
    async fn test_list_reviews_filters_hidden() {
        let mut mock_repo = MockListRepository::new();
        let mut list = reviewed_list(&[5.0, 3.0, 4.0]);
        list.set_review_visibility(0, false);

        mock_repo
            .expect_find_by_name()
            .returning(move |_| Ok(Some(list.clone())));

        let usecase = ReviewsUseCase::new(mock_repo);
        let reviews = usecase.list_reviews("Trip").await.unwrap();

        let ratings: Vec<f64> = reviews.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![3.0, 4.0]);
    }

    #[tokio::test]
    async fn test_all_reviews_include_hidden_with_positions() {
        let mut mock_repo = MockListRepository::new();
        let mut first = reviewed_list(&[5.0, 1.0]);
        first.set_review_visibility(1, false);
        let mut second = make_list("Other", "someone@example.com");
        second.add_review(Review::new(2.0, "hm".to_string(), "x".to_string()));

        mock_repo
            .expect_find_all()
            .returning(move || Ok(vec![first.clone(), second.clone()]));

        let usecase = ReviewsUseCase::new(mock_repo);
        let entries = usecase.all_reviews().await.unwrap();

        let positions: Vec<(&str, usize, bool)> = entries
            .iter()
            .map(|e| (e.list_name.as_str(), e.index, e.review.is_visible))
            .collect();
        assert_eq!(positions, vec![("Trip", 0, true), ("Trip", 1, false), ("Other", 0, true)]);
    }

    #[tokio::test]
    async fn test_set_review_visibility() {
        let mut mock_repo = MockListRepository::new();
        let list = reviewed_list(&[5.0, 3.0]);

        mock_repo
            .expect_find_by_name()
            .returning(move |_| Ok(Some(list.clone())));
        mock_repo
            .expect_set_review_visibility()
            .withf(|name, index, visible| name == "Trip" && *index == 1 && !*visible)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let usecase = ReviewsUseCase::new(mock_repo);
        assert!(usecase.set_review_visibility("Trip", 1, false).await.is_ok());
    }

    #[tokio::test]
    async fn test_set_review_visibility_out_of_range() {
        let mut mock_repo = MockListRepository::new();
        let list = reviewed_list(&[5.0, 3.0]);

        mock_repo
            .expect_find_by_name()
            .returning(move |_| Ok(Some(list.clone())));
        mock_repo.expect_set_review_visibility().times(0);

        let usecase = ReviewsUseCase::new(mock_repo);
        let result = usecase.set_review_visibility("Trip", 2, false).await;

        match result {
            Err(UsecaseError::NotFound(what)) => assert_eq!(what, "Review"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
