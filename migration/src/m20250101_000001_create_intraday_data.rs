use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IntradayData::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(IntradayData::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(IntradayData::Symbol).string_len(16).not_null())
                    .col(ColumnDef::new(IntradayData::Datetime).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(IntradayData::Open).double().not_null())
                    .col(ColumnDef::new(IntradayData::High).double().not_null())
                    .col(ColumnDef::new(IntradayData::Low).double().not_null())
                    .col(ColumnDef::new(IntradayData::Close).double().not_null())
                    .col(ColumnDef::new(IntradayData::Volume).big_integer().not_null().default(0))
                    // Indicator columns, NULL until computed or inside the warm-up window
                    .col(ColumnDef::new(IntradayData::Ema8).double().null())
                    .col(ColumnDef::new(IntradayData::Ema21).double().null())
                    .col(ColumnDef::new(IntradayData::Ema50).double().null())
                    .col(ColumnDef::new(IntradayData::Rsi14).double().null())
                    .col(ColumnDef::new(IntradayData::Macd).double().null())
                    .col(ColumnDef::new(IntradayData::MacdSignal).double().null())
                    .col(ColumnDef::new(IntradayData::Doji).boolean().null())
                    .col(ColumnDef::new(IntradayData::Hammer).boolean().null())
                    .col(ColumnDef::new(IntradayData::Engulfing).boolean().null())
                    .col(ColumnDef::new(IntradayData::Vwap).double().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_intraday_data_symbol_datetime")
                    .table(IntradayData::Table)
                    .col(IntradayData::Symbol)
                    .col(IntradayData::Datetime)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IntradayData::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum IntradayData {
    Table,
    Id,
    Symbol,
    Datetime,
    Open,
    High,
    Low,
    Close,
    Volume,
    #[sea_orm(iden = "ema_8")]
    Ema8,
    #[sea_orm(iden = "ema_21")]
    Ema21,
    #[sea_orm(iden = "ema_50")]
    Ema50,
    #[sea_orm(iden = "rsi_14")]
    Rsi14,
    Macd,
    MacdSignal,
    Doji,
    Hammer,
    Engulfing,
    Vwap,
}
