use crate::error::WorkbenchError;
use crate::feature::{self, Fid};
use crate::query::{columns, Filter};
use geojson::Feature;

/// Filtered view of a layer's attributes: the rows passing a filter and the columns to show for them.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeTable {
    columns: Vec<String>,
    rows: Vec<Row>,
    total: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    fid: Option<Fid>,
    values: Vec<String>,
}

impl AttributeTable {
    /// Builds the table of `features` passing the `filter`.
    ///
    /// Columns are the union of attribute names of the matching features. If nothing matches, columns of all
    /// features are used instead, so the header is not empty as long as there is any data.
    pub fn new(features: &[Feature], filter: &Filter) -> Self {
        let matching: Vec<&Feature> = filter.apply(features).collect();
        let columns = if matching.is_empty() {
            columns(features)
        } else {
            columns(matching.iter().copied())
        };

        let rows = matching
            .iter()
            .map(|f| Row {
                fid: feature::fid(f),
                values: columns
                    .iter()
                    .map(|column| feature::property_value(f, column))
                    .collect(),
            })
            .collect();

        Self {
            columns,
            rows,
            total: features.len(),
        }
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows passing the filter.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows pass the filter.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of features before filtering.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Feature ids of the rows.
    pub fn fids(&self) -> impl Iterator<Item = Option<Fid>> + '_ {
        self.rows.iter().map(|row| row.fid)
    }

    /// Displayed values of the rows, one entry per column.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> + '_ {
        self.rows.iter().map(|row| row.values.as_slice())
    }

    /// Writes the table as CSV: a header line with the column names, then one line per row. Fields containing a
    /// comma, a quote or a line break are quoted, with quotes doubled. A table without columns is written as empty
    /// lines.
    pub fn write_csv<W: std::io::Write>(&self, mut writer: W) -> Result<(), WorkbenchError> {
        if self.columns.is_empty() {
            // The csv writer quotes an empty single-field record as `""`.
            writer.write_all(&b"\n".repeat(self.rows.len() + 1))?;
            writer.flush()?;
            return Ok(());
        }

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(&row.values)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// CSV contents of the table. See [`AttributeTable::write_csv`].
    pub fn to_csv(&self) -> Result<String, WorkbenchError> {
        let mut buffer = vec![];
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|err| WorkbenchError::Input(err.to_string()))
    }
}

/// File name of the attribute export of the layer with the given name.
pub fn export_file_name(layer_name: &str) -> String {
    format!("{layer_name}_attribute_table.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::normalize;
    use serde_json::json;

    fn features(properties: serde_json::Value) -> Vec<Feature> {
        let items: Vec<_> = properties
            .as_array()
            .expect("array expected")
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut p = p.clone();
                p["_fid"] = json!(i);
                json!({ "type": "Feature", "geometry": null, "properties": p })
            })
            .collect();
        normalize(serde_json::Value::Array(items)).features
    }

    #[test]
    fn csv_quoting() {
        let features = features(json!([{ "a": "1,2" }, { "a": "say \"hi\"" }]));
        let table = AttributeTable::new(&features, &Filter::All);
        assert_eq!(
            table.to_csv().expect("export failed"),
            "a\n\"1,2\"\n\"say \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn csv_line_breaks_and_missing_values() {
        let features = features(json!([
            { "name": "two\nlines", "n": 1 },
            { "n": null },
            { "extra": true }
        ]));
        let table = AttributeTable::new(&features, &Filter::All);
        assert_eq!(table.columns(), ["name", "n", "extra"]);
        assert_eq!(
            table.to_csv().expect("export failed"),
            "name,n,extra\n\"two\nlines\",1,\n,,\n,,true\n"
        );
    }

    #[test]
    fn columns_of_filtered_rows() {
        let features = features(json!([{ "a": "x", "b": 1 }, { "a": "y", "c": 2 }]));
        let table = AttributeTable::new(&features, &Filter::parse("a=y"));
        assert_eq!(table.columns(), ["a", "c"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.total(), 2);
        assert_eq!(table.fids().collect::<Vec<_>>(), [Some(1)]);
        assert_eq!(table.rows().next(), Some(&["y".to_string(), "2".to_string()][..]));
    }

    #[test]
    fn empty_result_keeps_all_columns() {
        let features = features(json!([{ "a": "x", "b": 1 }, { "a": "y", "c": 2 }]));
        let table = AttributeTable::new(&features, &Filter::parse("nothing matches"));
        assert!(table.is_empty());
        assert_eq!(table.columns(), ["a", "b", "c"]);
        assert_eq!(table.to_csv().expect("export failed"), "a,b,c\n");
    }

    #[test]
    fn rows_without_attributes() {
        let features = features(json!([{}, {}, {}]));
        let table = AttributeTable::new(&features, &Filter::All);
        assert!(table.columns().is_empty());
        assert_eq!(table.len(), 3);
        assert_eq!(table.to_csv().expect("export failed"), "\n\n\n\n");
    }

    #[test]
    fn file_name() {
        assert_eq!(export_file_name("Roads"), "Roads_attribute_table.csv");
    }
}
