use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use super::{ServiceError, ServiceResult};
use crate::database::models::{GroupMember, Review, UserReview};
use crate::database::{assert_member, is_member, ResourceKind};
use crate::types::{GroupId, UserId};

pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub content: String,
    pub rating: f64,
}

#[derive(Debug, Serialize)]
pub struct GroupReviews {
    pub members: Vec<GroupMember>,
    pub reviews: Vec<Review>,
}

/// Ratings are kept in half-point steps, rounded down
pub fn floor_rating(rating: f64) -> f64 {
    (rating * 2.0).floor() / 2.0
}

/// Write or overwrite the caller's reviews of fellow group members.
/// Call inside a transaction so a bad entry leaves nothing behind.
pub async fn submit(
    conn: &mut SqliteConnection,
    caller: UserId,
    group_id: GroupId,
    reviews: BTreeMap<UserId, ReviewInput>,
) -> ServiceResult<usize> {
    assert_member(conn, caller, group_id, ResourceKind::Group).await?;

    if reviews.is_empty() {
        return Err(ServiceError::invalid("no reviews given"));
    }

    for (user_id, review) in reviews.iter() {
        if !review.rating.is_finite() || !(0.0..=MAX_RATING).contains(&review.rating) {
            return Err(ServiceError::invalid(format!("rating must be between 0 and {}", MAX_RATING)));
        }
        if !is_member(conn, *user_id, group_id, ResourceKind::Group).await? {
            return Err(ServiceError::invalid(format!("user {} is not a member of the group", user_id)));
        }

        sqlx::query(
            r#"
            INSERT INTO review (group_id, reviewer_id, user_id, content, rating)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (group_id, reviewer_id, user_id)
            DO UPDATE SET content = excluded.content, rating = excluded.rating
            "#,
        )
        .bind(group_id)
        .bind(caller)
        .bind(user_id)
        .bind(&review.content)
        .bind(floor_rating(review.rating))
        .execute(&mut *conn)
        .await?;
    }

    tracing::info!("User {} reviewed {} members of group {}", caller, reviews.len(), group_id);
    Ok(reviews.len())
}

/// Members of the group together with the reviews the caller wrote there
pub async fn for_group(conn: &mut SqliteConnection, caller: UserId, group_id: GroupId) -> ServiceResult<GroupReviews> {
    assert_member(conn, caller, group_id, ResourceKind::Group).await?;

    let members = sqlx::query_as(
        r#"
        SELECT u.id, u.name, u.description
        FROM "user" u
        INNER JOIN group_member gm ON gm.user_id = u.id
        WHERE gm.group_id = ?
        ORDER BY u.id
        "#,
    )
    .bind(group_id)
    .fetch_all(&mut *conn)
    .await?;

    let reviews = sqlx::query_as(
        r#"
        SELECT r.id, r.user_id, u.name, r.content, r.rating, r.create_at
        FROM review r
        INNER JOIN "user" u ON u.id = r.user_id
        WHERE r.group_id = ? AND r.reviewer_id = ?
        ORDER BY r.user_id
        "#,
    )
    .bind(group_id)
    .bind(caller)
    .fetch_all(&mut *conn)
    .await?;

    Ok(GroupReviews { members, reviews })
}

/// Reviews written about a user, labelled with the course of the group
pub async fn about_user(conn: &mut SqliteConnection, user_id: UserId) -> ServiceResult<Vec<UserReview>> {
    let reviews = sqlx::query_as(
        r#"
        SELECT r.id, r.content, r.rating, c.name AS course
        FROM review r
        INNER JOIN "group" g ON g.id = r.group_id
        INNER JOIN course c ON c.id = g.course_id
        WHERE r.user_id = ?
        ORDER BY r.id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::AccessError;
    use crate::testing::TestContext;

    fn review(content: &str, rating: f64) -> ReviewInput {
        ReviewInput {
            content: content.to_string(),
            rating,
        }
    }

    #[test]
    fn ratings_floor_to_half_points() {
        assert_eq!(floor_rating(4.9), 4.5);
        assert_eq!(floor_rating(4.5), 4.5);
        assert_eq!(floor_rating(0.4), 0.0);
        assert_eq!(floor_rating(5.0), 5.0);
    }

    #[test]
    fn body_keys_parse_as_user_ids() {
        let body: BTreeMap<UserId, ReviewInput> =
            serde_json::from_str(r#"{"2": {"content": "solid", "rating": 4}}"#).unwrap();
        assert_eq!(body[&2].rating, 4.0);
    }

    #[tokio::test]
    async fn resubmitting_overwrites() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let mate = ctx.create_user("mate").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();
        ctx.join_group(mate, group).await.unwrap();
        let mut conn = ctx.db.acquire().await.unwrap();

        submit(&mut conn, owner, group, BTreeMap::from([(mate, review("ok", 3.2))]))
            .await
            .unwrap();
        submit(&mut conn, owner, group, BTreeMap::from([(mate, review("great", 4.7))]))
            .await
            .unwrap();

        let page = for_group(&mut conn, owner, group).await.unwrap();
        assert_eq!(page.members.len(), 2);
        assert_eq!(page.reviews.len(), 1);
        assert_eq!(page.reviews[0].content, "great");
        assert_eq!(page.reviews[0].rating, 4.5);

        let about = about_user(&mut conn, mate).await.unwrap();
        assert_eq!(about.len(), 1);
        assert_eq!(about[0].course, "Systems");
    }

    #[tokio::test]
    async fn rejects_outsiders_and_bad_ratings() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let outsider = ctx.create_user("outsider").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();
        let mut conn = ctx.db.acquire().await.unwrap();

        assert!(matches!(
            submit(&mut conn, outsider, group, BTreeMap::from([(owner, review("hi", 3.0))])).await,
            Err(ServiceError::Access(AccessError::NotAMember))
        ));
        assert!(matches!(
            submit(&mut conn, owner, group, BTreeMap::from([(outsider, review("hi", 3.0))])).await,
            Err(ServiceError::Invalid(_))
        ));
        assert!(matches!(
            submit(&mut conn, owner, group, BTreeMap::from([(owner, review("hi", 7.0))])).await,
            Err(ServiceError::Invalid(_))
        ));
        assert!(matches!(
            submit(&mut conn, owner, group, BTreeMap::new()).await,
            Err(ServiceError::Invalid(_))
        ));
    }
}
