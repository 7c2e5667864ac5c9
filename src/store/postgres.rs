// Postgres store over the diesel-async bb8 pool

use async_trait::async_trait;
use bb8::PooledConnection;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::{PaylinkStore, StoreError, StoreResult};
use crate::db::DieselPool;
use crate::models::{
    EphemeralLink, EphemeralLinkMethod, NewEphemeralLink, NewPageView, NewPaymentMethod, NewUser,
    PaymentMethod, ReferralChangeset, User,
};
use crate::schema::{ephemeral_link_methods, ephemeral_links, page_views, payment_methods, users};

type PgConnection<'a> = PooledConnection<'a, AsyncDieselConnectionManager<AsyncPgConnection>>;

#[derive(Clone)]
pub struct DieselStore {
    pool: DieselPool,
}

impl DieselStore {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> StoreResult<PgConnection<'_>> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

#[async_trait]
impl PaylinkStore for DieselStore {
    async fn ensure_user(&self, user: NewUser) -> StoreResult<User> {
        let mut conn = self.conn().await?;

        diesel::insert_into(users::table)
            .values(&user)
            .on_conflict(users::id)
            .do_nothing()
            .execute(&mut conn)
            .await?;

        let stored = users::table
            .find(user.id)
            .select(User::as_select())
            .first(&mut conn)
            .await?;
        Ok(stored)
    }

    async fn get_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        let user = users::table
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        let user = users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(user)
    }

    async fn set_username(
        &self,
        user_id: Uuid,
        username: &str,
        display_name: &str,
    ) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        let user = diesel::update(
            users::table
                .filter(users::id.eq(user_id))
                .filter(users::username.is_null()),
        )
        .set((
            users::username.eq(username),
            users::display_name.eq(display_name),
        ))
        .returning(User::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?;
        Ok(user)
    }

    async fn list_payment_methods(&self, user_id: Uuid) -> StoreResult<Vec<PaymentMethod>> {
        let mut conn = self.conn().await?;
        let methods = payment_methods::table
            .filter(payment_methods::user_id.eq(user_id))
            .order((payment_methods::created_at.asc(), payment_methods::id.asc()))
            .select(PaymentMethod::as_select())
            .load(&mut conn)
            .await?;
        Ok(methods)
    }

    async fn insert_payment_method(&self, method: NewPaymentMethod) -> StoreResult<PaymentMethod> {
        let mut conn = self.conn().await?;
        let stored = diesel::insert_into(payment_methods::table)
            .values(&method)
            .returning(PaymentMethod::as_returning())
            .get_result(&mut conn)
            .await?;
        Ok(stored)
    }

    async fn delete_payment_method(&self, user_id: Uuid, method_id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        // ephemeral_link_methods rows go with it via ON DELETE CASCADE
        let deleted = diesel::delete(
            payment_methods::table
                .filter(payment_methods::id.eq(method_id))
                .filter(payment_methods::user_id.eq(user_id)),
        )
        .execute(&mut conn)
        .await?;
        Ok(deleted > 0)
    }

    async fn update_referral(
        &self,
        user_id: Uuid,
        method_id: Uuid,
        changes: ReferralChangeset,
    ) -> StoreResult<Option<PaymentMethod>> {
        let mut conn = self.conn().await?;
        let updated = diesel::update(
            payment_methods::table
                .filter(payment_methods::id.eq(method_id))
                .filter(payment_methods::user_id.eq(user_id)),
        )
        .set(&changes)
        .returning(PaymentMethod::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?;
        Ok(updated)
    }

    async fn insert_ephemeral_link(
        &self,
        link: NewEphemeralLink,
        method_ids: &[Uuid],
    ) -> StoreResult<EphemeralLink> {
        let rows: Vec<EphemeralLinkMethod> = method_ids
            .iter()
            .map(|method_id| EphemeralLinkMethod {
                ephemeral_link_id: link.id,
                payment_method_id: *method_id,
            })
            .collect();

        let mut conn = self.conn().await?;
        let stored = conn
            .transaction::<_, DieselError, _>(|conn| {
                Box::pin(async move {
                    let stored = diesel::insert_into(ephemeral_links::table)
                        .values(&link)
                        .returning(EphemeralLink::as_returning())
                        .get_result(conn)
                        .await?;

                    diesel::insert_into(ephemeral_link_methods::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;

                    Ok(stored)
                })
            })
            .await?;
        Ok(stored)
    }

    async fn find_ephemeral_link(
        &self,
        user_id: Uuid,
        slug: &str,
    ) -> StoreResult<Option<EphemeralLink>> {
        let mut conn = self.conn().await?;
        let link = ephemeral_links::table
            .filter(ephemeral_links::user_id.eq(user_id))
            .filter(ephemeral_links::slug.eq(slug))
            .select(EphemeralLink::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(link)
    }

    async fn list_ephemeral_links(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<EphemeralLink>> {
        let mut conn = self.conn().await?;
        let links = ephemeral_links::table
            .filter(ephemeral_links::user_id.eq(user_id))
            .order(ephemeral_links::created_at.desc())
            .limit(limit)
            .select(EphemeralLink::as_select())
            .load(&mut conn)
            .await?;
        Ok(links)
    }

    async fn linked_payment_methods(&self, link_id: Uuid) -> StoreResult<Vec<PaymentMethod>> {
        let mut conn = self.conn().await?;
        let methods = payment_methods::table
            .inner_join(ephemeral_link_methods::table)
            .filter(ephemeral_link_methods::ephemeral_link_id.eq(link_id))
            .order((payment_methods::created_at.asc(), payment_methods::id.asc()))
            .select(PaymentMethod::as_select())
            .load(&mut conn)
            .await?;
        Ok(methods)
    }

    async fn consume_view(
        &self,
        link_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<EphemeralLink>> {
        let mut conn = self.conn().await?;
        // Single conditional UPDATE: concurrent visitors can never push view_count past max_views
        let updated = diesel::update(
            ephemeral_links::table
                .filter(ephemeral_links::id.eq(link_id))
                .filter(ephemeral_links::view_count.lt(ephemeral_links::max_views))
                .filter(ephemeral_links::expires_at.gt(now)),
        )
        .set(ephemeral_links::view_count.eq(ephemeral_links::view_count + 1))
        .returning(EphemeralLink::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?;
        Ok(updated)
    }

    async fn insert_page_view(&self, view: NewPageView) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        diesel::insert_into(page_views::table)
            .values(&view)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn count_page_views(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<i64> {
        let mut conn = self.conn().await?;
        let mut query = page_views::table
            .filter(page_views::user_id.eq(user_id))
            .into_boxed();
        if let Some(since) = since {
            query = query.filter(page_views::viewed_at.ge(since));
        }
        let count = query.count().get_result::<i64>(&mut conn).await?;
        Ok(count)
    }

    async fn health_check(&self) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }
}
