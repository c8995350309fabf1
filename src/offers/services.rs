use super::models::{NewOffer, Offer, OfferQuery, UpdateOfferRequest};
use crate::auth::{AuthedUser, Role};
use crate::common::helpers::{coerce_string, coerce_string_list, to_json_list};
use crate::common::{generate_offer_id, ApiError};
use sqlx::SqlitePool;
use tracing::{debug, info};

pub struct OffersService {
    db: SqlitePool,
}

/// Application status that follows an offer status, if any
pub fn application_status_for(offer_status: &str) -> Option<&'static str> {
    match offer_status {
        "accepted" => Some("hired"),
        "rejected" => Some("rejected"),
        _ => None,
    }
}

impl OffersService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Offers visible to the caller, newest first. Query filters combine
    /// with AND; candidates only ever see their own offers and recruiters
    /// the offers on their jobs.
    pub async fn list_offers(&self, user: &AuthedUser, query: &OfferQuery) -> Result<Vec<Offer>, ApiError> {
        let mut sql = String::from(
            "SELECT o.* FROM offers o JOIN jobs j ON j.id = o.job_id WHERE 1 = 1",
        );
        let mut params: Vec<&str> = Vec::new();

        match user.role {
            Role::Candidate => {
                sql.push_str(" AND o.candidate_id = ?");
                params.push(&user.id);
            }
            Role::Recruiter => {
                sql.push_str(" AND j.recruiter_id = ?");
                params.push(&user.id);
            }
            Role::Admin => {}
        }

        let filters = [
            ("o.candidate_id", query.candidate_id.as_deref()),
            ("o.job_id", query.job_id.as_deref()),
            ("o.application_id", query.application_id.as_deref()),
        ];
        for (column, value) in filters {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                sql.push_str(&format!(" AND {} = ?", column));
                params.push(value);
            }
        }

        sql.push_str(" ORDER BY o.created_at DESC, o.rowid DESC");

        let mut query_builder = sqlx::query_as::<_, Offer>(&sql);
        for param in params {
            query_builder = query_builder.bind(param);
        }

        let offers = query_builder.fetch_all(&self.db).await?;
        debug!(user_id = %user.id, count = offers.len(), "Listed offers");
        Ok(offers)
    }

    pub async fn get_offer(&self, id: &str) -> Result<Offer, ApiError> {
        sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Offer not found".to_string()))
    }

    /// Inserts the offer and marks its application `offer_sent`
    pub async fn create_offer(&self, offer: NewOffer) -> Result<Offer, ApiError> {
        let id = generate_offer_id();
        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO offers (id, application_id, candidate_id, job_id, salary, start_date,
                                benefits, notes, recruiter_id, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending')
            "#,
        )
        .bind(&id)
        .bind(&offer.application_id)
        .bind(&offer.candidate_id)
        .bind(&offer.job_id)
        .bind(&offer.salary)
        .bind(&offer.start_date)
        .bind(to_json_list(&offer.benefits))
        .bind(&offer.notes)
        .bind(&offer.recruiter_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE applications SET status = 'offer_sent', updated_at = datetime('now') WHERE id = ?",
        )
        .bind(&offer.application_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            offer_id = %id,
            application_id = %offer.application_id,
            recruiter_id = %offer.recruiter_id,
            "Offer created"
        );

        self.get_offer(&id).await
    }

    /// Applies the given changes and moves the application along with the
    /// offer status.
    pub async fn update_offer(&self, id: &str, request: UpdateOfferRequest) -> Result<Offer, ApiError> {
        let existing = self.get_offer(id).await?;

        let mut updates = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(salary) = coerce_string(request.salary.as_ref()) {
            updates.push("salary = ?");
            params.push(salary);
        }

        if let Some(start_date) = &request.start_date {
            updates.push("start_date = ?");
            params.push(start_date.trim().to_string());
        }

        if request.benefits.is_some() {
            updates.push("benefits = ?");
            params.push(to_json_list(&coerce_string_list(request.benefits.as_ref())));
        }

        if let Some(notes) = &request.notes {
            updates.push("notes = ?");
            params.push(notes.clone());
        }

        if let Some(status) = &request.status {
            updates.push("status = ?");
            params.push(status.clone());
        }

        if let Some(response) = request.candidate_response.as_deref().filter(|r| !r.is_empty()) {
            updates.push("candidate_response = ?");
            params.push(response.to_string());
        }

        if updates.is_empty() {
            return Ok(existing);
        }

        updates.push("updated_at = datetime('now')");
        let sql = format!("UPDATE offers SET {} WHERE id = ?", updates.join(", "));

        let mut tx = self.db.begin().await?;

        let mut query_builder = sqlx::query(&sql);
        for param in &params {
            query_builder = query_builder.bind(param);
        }
        query_builder.bind(id).execute(&mut *tx).await?;

        if let Some(next) = request.status.as_deref().and_then(application_status_for) {
            sqlx::query(
                "UPDATE applications SET status = ?, updated_at = datetime('now') WHERE id = ?",
            )
            .bind(next)
            .bind(&existing.application_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(offer_id = %id, status = ?request.status, "Offer updated");

        self.get_offer(id).await
    }
}
