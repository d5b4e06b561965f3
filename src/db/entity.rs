//! Table models and their [`PrimaryStore`](crate::primary::PrimaryStore) implementations.
pub mod crop;
pub mod farm;
pub mod planted;
pub mod producer;

use sea_orm::sea_query::Expr;
use sea_orm::sea_query::Func;
use sea_orm::sea_query::SimpleExpr;
use sea_orm::ColumnTrait;
use sea_orm::IntoSimpleExpr;

pub use crop::Model as CropRow;
pub use farm::Model as FarmRow;
pub use planted::Model as PlantedRow;
pub use producer::Model as ProducerRow;

// Case-insensitive substring match. Lowered on both sides so SQLite and PostgreSQL agree.
pub(crate) fn name_contains<C: ColumnTrait>(column: C, name: &str) -> SimpleExpr {
    Expr::expr(Func::lower(column.into_simple_expr())).like(format!("%{}%", name.to_lowercase()))
}
