use async_trait::async_trait;
use sqlx::FromRow;

use osdesk_parties::CompanyProfile;

use super::{PgStore, map_sqlx_error};
use crate::StoreResult;
use crate::repository::CompanyRepository;

#[derive(Debug, FromRow)]
struct CompanyRow {
    name: String,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    cnpj: Option<String>,
    notes: Option<String>,
    website: Option<String>,
}

#[async_trait]
impl CompanyRepository for PgStore {
    async fn get_company(&self) -> StoreResult<Option<CompanyProfile>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            "SELECT name, address, phone, email, cnpj, notes, website FROM company WHERE id = 1",
        )
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_company", e))?;

        Ok(row.map(|r| CompanyProfile {
            name: r.name,
            address: r.address,
            phone: r.phone,
            email: r.email,
            cnpj: r.cnpj,
            notes: r.notes,
            website: r.website,
        }))
    }

    async fn save_company(&self, profile: &CompanyProfile) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO company (id, name, address, phone, email, cnpj, notes, website)
            VALUES (1, $1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                address = EXCLUDED.address,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                cnpj = EXCLUDED.cnpj,
                notes = EXCLUDED.notes,
                website = EXCLUDED.website
            "#,
        )
        .bind(&profile.name)
        .bind(&profile.address)
        .bind(&profile.phone)
        .bind(&profile.email)
        .bind(&profile.cnpj)
        .bind(&profile.notes)
        .bind(&profile.website)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_company", e))?;
        Ok(())
    }
}
