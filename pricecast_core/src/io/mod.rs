pub mod series_reader;
