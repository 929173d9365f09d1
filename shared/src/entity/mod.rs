pub mod intraday_data;
