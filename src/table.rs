pub mod openai_completion;

#[derive(serde::Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    String,
    Int,
    Json,
}

#[derive(serde::Serialize, Clone, Debug)]
pub struct Column {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub typ: ColumnType,
    pub description: &'static str,
}

#[derive(serde::Serialize, Clone, Debug)]
pub struct KeyColumn {
    pub name: &'static str,
    pub required: bool,
}

/// What a table declares to the host: its columns and which of them may be
/// passed down as equality qualifiers.
#[derive(serde::Serialize, Clone, Debug)]
pub struct Definition {
    pub name: &'static str,
    pub description: &'static str,
    pub key_columns: Vec<KeyColumn>,
    pub columns: Vec<Column>,
}

/// Equality qualifiers handed to a list call, keyed by column name. JSON
/// columns carry their value in its textual form.
#[derive(Clone, Debug, Default)]
pub struct Quals(std::collections::HashMap<String, String>);

impl Quals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(|v| v.as_str())
    }
}

pub type Row = serde_json::Map<String, serde_json::Value>;

pub type RowStream = std::pin::Pin<Box<dyn futures_core::stream::Stream<Item = Result<Row, anyhow::Error>> + Send>>;

pub fn to_row(v: impl serde::Serialize) -> Result<Row, anyhow::Error> {
    match serde_json::to_value(v)? {
        serde_json::Value::Object(row) => Ok(row),
        v => Err(anyhow::format_err!("row is not an object: {}", v)),
    }
}

#[async_trait::async_trait]
pub trait Table {
    fn definition(&self) -> Definition;
    async fn list(&self, quals: &Quals) -> Result<RowStream, anyhow::Error>;
}

pub fn definition(name: &str) -> Result<Definition, anyhow::Error> {
    Ok(match name {
        openai_completion::NAME => openai_completion::definition(),
        _ => {
            return Err(anyhow::format_err!("unknown table: {}", name));
        }
    })
}

pub fn new_table(name: &str, client: crate::openai::Client) -> Result<Box<dyn Table + Send + Sync>, anyhow::Error> {
    Ok(match name {
        openai_completion::NAME => Box::new(openai_completion::Table::new(client)),
        _ => {
            return Err(anyhow::format_err!("unknown table: {}", name));
        }
    })
}
