use sea_orm::entity::prelude::*;

/// One stored bar; indicator columns stay NULL until the pipeline fills them
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "intraday_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub symbol: String,
    pub datetime: DateTimeUtc,
    #[sea_orm(column_type = "Double")]
    pub open: f64,
    #[sea_orm(column_type = "Double")]
    pub high: f64,
    #[sea_orm(column_type = "Double")]
    pub low: f64,
    #[sea_orm(column_type = "Double")]
    pub close: f64,
    pub volume: i64,
    #[sea_orm(column_type = "Double", nullable)]
    pub ema_8: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub ema_21: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub ema_50: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub rsi_14: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub macd: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub macd_signal: Option<f64>,
    pub doji: Option<bool>,
    pub hammer: Option<bool>,
    pub engulfing: Option<bool>,
    #[sea_orm(column_type = "Double", nullable)]
    pub vwap: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
