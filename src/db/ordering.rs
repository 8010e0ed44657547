use sqlx::{postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::content::ordering::{plan_move, Ordered, ReorderPlan};

/// Tables whose rows carry a drag-and-drop `display_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderedTable {
    Services,
    Portfolio,
}

impl OrderedTable {
    fn name(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Portfolio => "portfolio",
        }
    }

    fn columns(self) -> &'static str {
        match self {
            Self::Services => crate::db::services::COLUMNS,
            Self::Portfolio => crate::db::portfolio::COLUMNS,
        }
    }
}

/// Moves `active` onto `over` within one transaction.
///
/// The whole list is read with `FOR UPDATE`, so a concurrent reorder waits
/// for this one to commit and then plans against the rows it left behind.
/// Returns `None` (and writes nothing) when either id is unknown; otherwise
/// the rows as loaded plus the plan that was applied to them.
pub async fn reorder<T>(
    pool: &PgPool,
    table: OrderedTable,
    active: Uuid,
    over: Uuid,
) -> Result<Option<(Vec<T>, ReorderPlan)>, sqlx::Error>
where
    T: Ordered + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let select = format!(
        "SELECT {} FROM {} ORDER BY display_order ASC, created_at ASC FOR UPDATE",
        table.columns(),
        table.name()
    );
    let update = format!(
        "UPDATE {} SET display_order = $2, updated_at = now() WHERE id = $1",
        table.name()
    );

    let mut tx = pool.begin().await?;
    let mut rows: Vec<T> = sqlx::query_as(&select).fetch_all(&mut *tx).await?;
    // Rows that were waiting on a lock come back with their new values but
    // in the pre-lock sort; the stable sort keeps the created_at tiebreak.
    rows.sort_by_key(|row| row.display_order());

    let Some(plan) = plan_move(&rows, active, over) else {
        return Ok(None);
    };

    for change in &plan.changes {
        sqlx::query(&update)
            .bind(change.id)
            .bind(change.display_order)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::debug!(table = table.name(), rows = plan.changes.len(), "display order updated");
    Ok(Some((rows, plan)))
}
