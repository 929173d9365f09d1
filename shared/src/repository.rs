//! Storage of raw bars and their computed indicators

use crate::entity::intraday_data;
use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use std::sync::Arc;
use tracing::{debug, info};
use trading_gym::data::{FeatureRow, SymbolSeries, Tick};

/// Rows per INSERT; keeps bound parameters under SQLite's limit
const INSERT_CHUNK: usize = 100;

pub struct IntradayRepository {
    db: Arc<DatabaseConnection>,
}

impl IntradayRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert bars, skipping any (symbol, datetime) already stored
    pub async fn insert_ticks(&self, ticks: &[Tick]) -> Result<u64> {
        let mut inserted = 0;
        for chunk in ticks.chunks(INSERT_CHUNK) {
            let models = chunk.iter().map(|tick| intraday_data::ActiveModel {
                symbol: ActiveValue::Set(tick.symbol.clone()),
                datetime: ActiveValue::Set(tick.timestamp),
                open: ActiveValue::Set(tick.open),
                high: ActiveValue::Set(tick.high),
                low: ActiveValue::Set(tick.low),
                close: ActiveValue::Set(tick.close),
                volume: ActiveValue::Set(i64::try_from(tick.volume).unwrap_or(i64::MAX)),
                ..Default::default()
            });

            inserted += intraday_data::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::columns([
                        intraday_data::Column::Symbol,
                        intraday_data::Column::Datetime,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(self.db.as_ref())
                .await
                .context("failed to insert intraday bars")?;
        }
        info!("Inserted {} of {} bars", inserted, ticks.len());
        Ok(inserted)
    }

    /// Bars of one symbol, oldest first
    pub async fn load_ticks(&self, symbol: &str) -> Result<Vec<Tick>> {
        let models = intraday_data::Entity::find()
            .filter(intraday_data::Column::Symbol.eq(symbol))
            .order_by_asc(intraday_data::Column::Datetime)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(to_tick).collect())
    }

    /// Write indicator columns onto the bars they were computed from
    pub async fn save_features(&self, rows: &[FeatureRow]) -> Result<u64> {
        let txn = self.db.begin().await?;
        let mut updated = 0;
        for row in rows {
            let result = intraday_data::Entity::update_many()
                .col_expr(intraday_data::Column::Ema8, Expr::value(row.ema_8))
                .col_expr(intraday_data::Column::Ema21, Expr::value(row.ema_21))
                .col_expr(intraday_data::Column::Ema50, Expr::value(row.ema_50))
                .col_expr(intraday_data::Column::Rsi14, Expr::value(row.rsi_14))
                .col_expr(intraday_data::Column::Macd, Expr::value(row.macd))
                .col_expr(intraday_data::Column::MacdSignal, Expr::value(row.macd_signal))
                .col_expr(intraday_data::Column::Doji, Expr::value(row.doji))
                .col_expr(intraday_data::Column::Hammer, Expr::value(row.hammer))
                .col_expr(intraday_data::Column::Engulfing, Expr::value(row.engulfing))
                .col_expr(intraday_data::Column::Vwap, Expr::value(row.vwap))
                .filter(intraday_data::Column::Symbol.eq(row.symbol.as_str()))
                .filter(intraday_data::Column::Datetime.eq(row.timestamp))
                .exec(&txn)
                .await?;
            updated += result.rows_affected;
        }
        txn.commit().await?;
        debug!("Updated indicators on {} bars", updated);
        Ok(updated)
    }

    /// Feature rows of one symbol, oldest first; warm-up rows keep their NULLs
    pub async fn load_features(&self, symbol: &str) -> Result<Vec<FeatureRow>> {
        let models = intraday_data::Entity::find()
            .filter(intraday_data::Column::Symbol.eq(symbol))
            .order_by_asc(intraday_data::Column::Datetime)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(to_feature_row).collect())
    }

    /// Feature series for each requested symbol, in the given order
    pub async fn load_feature_series(&self, symbols: &[String]) -> Result<Vec<SymbolSeries>> {
        let mut series = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            series.push(SymbolSeries::new(symbol.clone(), self.load_features(symbol).await?));
        }
        Ok(series)
    }

    /// Distinct stored symbols, sorted
    pub async fn symbols(&self) -> Result<Vec<String>> {
        let symbols = intraday_data::Entity::find()
            .select_only()
            .column(intraday_data::Column::Symbol)
            .distinct()
            .order_by_asc(intraday_data::Column::Symbol)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await?;
        Ok(symbols)
    }
}

fn to_tick(model: intraday_data::Model) -> Tick {
    Tick::new(
        model.symbol,
        model.datetime,
        model.open,
        model.high,
        model.low,
        model.close,
        u64::try_from(model.volume).unwrap_or(0),
    )
}

fn to_feature_row(model: intraday_data::Model) -> FeatureRow {
    FeatureRow {
        symbol: model.symbol,
        timestamp: model.datetime,
        close: model.close,
        ema_8: model.ema_8,
        ema_21: model.ema_21,
        ema_50: model.ema_50,
        rsi_14: model.rsi_14,
        macd: model.macd,
        macd_signal: model.macd_signal,
        doji: model.doji.unwrap_or(false),
        hammer: model.hammer.unwrap_or(false),
        engulfing: model.engulfing.unwrap_or(false),
        vwap: model.vwap,
    }
}
