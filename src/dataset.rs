//! In-memory tabular model shared by every pipeline stage.
//!
//! A [`Record`] is an ordered set of `column -> value` pairs. A [`Dataset`]
//! owns its records plus the schema: the first-seen-ordered union of every
//! record's column names. Rows that lack a schema column read as empty.

use std::fmt;

use clap::ValueEnum;

/// The two field separators the dataset roles use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Separator {
    #[value(alias = ",")]
    Comma,
    #[value(alias = ";")]
    Semicolon,
}

impl Separator {
    pub fn as_byte(self) -> u8 {
        match self {
            Separator::Comma => b',',
            Separator::Semicolon => b';',
        }
    }

    pub fn as_char(self) -> char {
        self.as_byte() as char
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Pairs headers with values positionally. Missing trailing values become
    /// empty strings; a repeated header keeps its first occurrence.
    pub fn from_row(headers: &[String], values: &[String]) -> Self {
        let mut record = Record::default();
        for (idx, header) in headers.iter().enumerate() {
            let value = values.get(idx).cloned().unwrap_or_default();
            record.insert(header.clone(), value);
        }
        record
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Record::default();
        for (key, value) in pairs {
            record.insert(key.into(), value.into());
        }
        record
    }

    fn insert(&mut self, column: String, value: String) {
        if !self.fields.iter().any(|(name, _)| *name == column) {
            self.fields.push((column, value));
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// An empty dataset that still carries a header.
    pub fn with_columns(columns: Vec<String>) -> Self {
        let mut dataset = Dataset::default();
        for column in columns {
            dataset.add_column(column);
        }
        dataset
    }

    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let mut dataset = Dataset::default();
        dataset.extend(records);
        dataset
    }

    pub fn push(&mut self, record: Record) {
        for column in record.columns() {
            if !self.columns.iter().any(|existing| existing == column) {
                self.columns.push(column.to_string());
            }
        }
        self.records.push(record);
    }

    fn add_column(&mut self, column: String) {
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of one record laid out in schema order, absent columns as `""`.
    pub fn row_values<'a>(&'a self, record: &'a Record) -> impl Iterator<Item = &'a str> {
        self.columns
            .iter()
            .map(move |column| record.get(column).unwrap_or(""))
    }

    /// All rows as owned strings in schema order.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|record| self.row_values(record).map(str::to_string).collect())
            .collect()
    }
}

impl Extend<Record> for Dataset {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.push(record);
        }
    }
}
