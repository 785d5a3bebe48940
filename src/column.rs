use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

pub type ColumnId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Id,
    Item,
    Label,
    Metadata,
    Predistill,
    Postdistill,
    Output,
    Embedding,
}
impl ColumnType {
    /// Columns that only identify an instance; they never get a histogram.
    #[inline]
    pub fn is_identifier(&self) -> bool {
        matches!(self, ColumnType::Id | ColumnType::Item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Nominal,
    Continuous,
    Boolean,
    Datetime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub column_type: ColumnType,
    pub data_type: DataType,
    #[serde(default)]
    pub model: Option<String>,
}
impl Column {
    pub fn new(id: &str, column_type: ColumnType, data_type: DataType) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            column_type,
            data_type,
            model: None,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// True when the column belongs to every model or to `model` itself.
    #[inline]
    pub fn visible_for(&self, model: &str) -> bool {
        match self.model.as_deref() {
            None => true,
            Some(m) => m == model,
        }
    }
}

/// Ordered collection of column metadata, as loaded for the active project.
#[derive(Debug, Default)]
pub struct ColumnCatalog {
    columns: RwLock<Vec<Column>>,
}
impl ColumnCatalog {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns: RwLock::new(columns),
        }
    }

    pub fn set(&self, columns: Vec<Column>) {
        *self.columns.write() = columns;
    }

    pub fn columns(&self) -> Vec<Column> {
        self.columns.read().clone()
    }

    pub fn find(&self, id: &str) -> Option<Column> {
        self.columns.read().iter().find(|c| c.id == id).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_json() {
        let raw = r#"{"id":"0label","name":"label","columnType":"LABEL","dataType":"NOMINAL","model":null}"#;
        let col: Column = serde_json::from_str(raw).unwrap();
        assert_eq!(col.column_type, ColumnType::Label);
        assert_eq!(col.data_type, DataType::Nominal);
        assert!(col.model.is_none());
        let back = serde_json::to_value(&col).unwrap();
        assert_eq!(back["columnType"], "LABEL");
    }

    #[test]
    fn test_visible_for() {
        let shared = Column::new("len", ColumnType::Metadata, DataType::Continuous);
        let scoped = Column::new("out", ColumnType::Output, DataType::Nominal).with_model("gpt");
        assert!(shared.visible_for("gpt"));
        assert!(scoped.visible_for("gpt"));
        assert!(!scoped.visible_for("llama"));
    }

    #[test]
    fn test_catalog_find() {
        let catalog = ColumnCatalog::new(vec![
            Column::new("a", ColumnType::Metadata, DataType::Nominal),
            Column::new("b", ColumnType::Metadata, DataType::Continuous),
        ]);
        assert_eq!(catalog.find("b").map(|c| c.data_type), Some(DataType::Continuous));
        assert!(catalog.find("zzz").is_none());
        catalog.set(vec![]);
        assert!(catalog.is_empty());
    }
}
