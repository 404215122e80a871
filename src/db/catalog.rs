use async_trait::async_trait;
use log::trace;

use super::query::PgDatabase;
use crate::constants::catalog::*;
use crate::error::{Result, SliceError};
use crate::partition::fill::PeriodWindow;
use crate::partition::naming::quote_ident;
use crate::partition::{Catalog, PartitionSettings, Sequence, Table};

impl PgDatabase {
    async fn single_text_column(&self, query: &str, table: &Table, by_regclass: bool) -> Result<Vec<String>> {
        let rows = if by_regclass {
            self.client.query(query, &[&table.quoted()]).await?
        } else {
            self.client.query(query, &[&table.schema, &table.name]).await?
        };
        rows.iter()
            .map(|row| row.try_get::<_, String>(0).map_err(SliceError::from))
            .collect()
    }

    async fn comment(&self, query: &str, params: &[&(dyn tokio_postgres::types::ToSql + Sync)]) -> Result<Option<String>> {
        let row = self.client.query_opt(query, params).await?;
        match row {
            Some(row) => Ok(row.try_get::<_, Option<String>>(0)?),
            None => Ok(None),
        }
    }
}

fn where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

#[async_trait]
impl Catalog for PgDatabase {
    async fn table_exists(&self, table: &Table) -> Result<bool> {
        let row = self
            .client
            .query_one(TABLE_EXISTS, &[&table.schema, &table.name])
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn view_exists(&self, table: &Table) -> Result<bool> {
        let row = self
            .client
            .query_one(VIEW_EXISTS, &[&table.schema, &table.name])
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn partitions(&self, table: &Table) -> Result<Vec<Table>> {
        let rows = self
            .client
            .query(LIST_PARTITIONS, &[&table.schema, &table.name])
            .await?;
        let mut partitions = Vec::with_capacity(rows.len());
        for row in rows {
            let schema: String = row.try_get("schema")?;
            let name: String = row.try_get("name")?;
            partitions.push(Table::new(schema, name));
        }
        trace!("{} 파티션 {} 개", table, partitions.len());
        Ok(partitions)
    }

    async fn primary_key(&self, table: &Table) -> Result<Vec<String>> {
        self.single_text_column(PRIMARY_KEY, table, false).await
    }

    async fn index_defs(&self, table: &Table) -> Result<Vec<String>> {
        self.single_text_column(INDEX_DEFS, table, true).await
    }

    async fn foreign_keys(&self, table: &Table) -> Result<Vec<String>> {
        self.single_text_column(FOREIGN_KEYS, table, true).await
    }

    async fn sequences(&self, table: &Table) -> Result<Vec<Sequence>> {
        let rows = self
            .client
            .query(SEQUENCES, &[&table.schema, &table.name])
            .await?;
        let mut sequences = Vec::with_capacity(rows.len());
        for row in rows {
            sequences.push(Sequence {
                schema: row.try_get("sequence_schema")?,
                name: row.try_get("sequence_name")?,
                column: row.try_get("related_column")?,
            });
        }
        Ok(sequences)
    }

    async fn columns(&self, table: &Table) -> Result<Vec<String>> {
        self.single_text_column(COLUMNS, table, false).await
    }

    async fn column_type(&self, table: &Table, column: &str) -> Result<Option<String>> {
        let row = self
            .client
            .query_opt(COLUMN_TYPE, &[&table.quoted(), &column])
            .await?;
        match row {
            Some(row) => Ok(Some(row.try_get(0)?)),
            None => Ok(None),
        }
    }

    async fn max_id(
        &self,
        table: &Table,
        primary_key: &str,
        filter: Option<&str>,
        below: Option<i64>,
    ) -> Result<i64> {
        let pk = quote_ident(primary_key);
        let mut conditions = Vec::new();
        if let Some(below) = below {
            conditions.push(format!("{} <= {}", pk, below));
        }
        if let Some(filter) = filter {
            conditions.push(filter.to_string());
        }
        let query = format!(
            "SELECT MAX({})::bigint FROM {}{}",
            pk,
            table.quoted(),
            where_clause(&conditions)
        );
        trace!("{}", query);
        let row = self.client.query_one(query.as_str(), &[]).await?;
        Ok(row.try_get::<_, Option<i64>>(0)?.unwrap_or(0))
    }

    async fn min_id(
        &self,
        table: &Table,
        primary_key: &str,
        window: Option<&PeriodWindow>,
        filter: Option<&str>,
    ) -> Result<Option<i64>> {
        let pk = quote_ident(primary_key);
        let mut conditions = Vec::new();
        if let Some(window) = window {
            conditions.push(window.to_sql());
        }
        if let Some(filter) = filter {
            conditions.push(filter.to_string());
        }
        let query = format!(
            "SELECT MIN({})::bigint FROM {}{}",
            pk,
            table.quoted(),
            where_clause(&conditions)
        );
        trace!("{}", query);
        let row = self.client.query_one(query.as_str(), &[]).await?;
        Ok(row.try_get::<_, Option<i64>>(0)?)
    }

    async fn fetch_settings(
        &self,
        table: &Table,
        trigger_name: &str,
    ) -> Result<Option<PartitionSettings>> {
        let quoted = table.quoted();
        if let Some(comment) = self.comment(TRIGGER_COMMENT, &[&trigger_name, &quoted]).await? {
            return Ok(PartitionSettings::from_comment(&comment, true));
        }
        match self.comment(TABLE_COMMENT, &[&quoted]).await? {
            Some(comment) => Ok(PartitionSettings::from_comment(&comment, false)),
            None => Ok(None),
        }
    }

    async fn server_version_num(&self) -> Result<i32> {
        let row = self.client.query_one(SERVER_VERSION_NUM, &[]).await?;
        let version: String = row.try_get(0)?;
        version
            .trim()
            .parse()
            .map_err(|_| SliceError::Config(format!("Unexpected server_version_num: {}", version)))
    }
}
