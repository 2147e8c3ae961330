use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{FlatMap, MISC_CATEGORY, SchemaCategory};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchemaPair {
    pub schema: Value,

    #[serde(default)]
    pub ui: Value,
}

/// Top-level categories in schema declaration order. `ui:order` reorders a
/// category's fields; `ui:hidden` excludes it from navigable sections.
pub fn categories(pair: &SchemaPair) -> Vec<SchemaCategory> {
    let Some(props) = pair.schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(props.len());
    for (key, category) in props {
        let title = category
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(key)
            .to_string();
        let declared: Vec<String> = category
            .get("properties")
            .and_then(Value::as_object)
            .map(|fields| fields.keys().cloned().collect())
            .unwrap_or_default();

        let ui_entry = pair.ui.get(key);
        let fields = match ui_entry
            .and_then(|u| u.get("ui:order"))
            .and_then(Value::as_array)
        {
            Some(order) => {
                let ordered: Vec<String> = order
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|name| declared.iter().any(|d| d == name))
                    .map(str::to_string)
                    .collect();
                let rest: Vec<String> = declared
                    .iter()
                    .filter(|d| !ordered.contains(d))
                    .cloned()
                    .collect();
                ordered.into_iter().chain(rest).collect()
            }
            None => declared,
        };
        let hidden = ui_entry
            .and_then(|u| u.get("ui:hidden"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        out.push(SchemaCategory {
            key: key.clone(),
            title,
            fields,
            hidden,
        });
    }
    out
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormCategory {
    pub key: String,
    pub title: String,
    pub hidden: bool,
    pub fields: Vec<(String, Value)>,
}

impl FormCategory {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }
}

/// Ephemeral: rebuilt per edit session and discarded after a successful save.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FormModel {
    pub categories: Vec<FormCategory>,
}

impl FormModel {
    pub fn category(&self, key: &str) -> Option<&FormCategory> {
        self.categories.iter().find(|c| c.key == key)
    }

    // Fields outside the loaded model are rejected rather than invented.
    pub fn set(&mut self, category: &str, field: &str, value: Value) -> bool {
        let Some(cat) = self.categories.iter_mut().find(|c| c.key == category) else {
            return false;
        };
        match cat.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn navigable_sections(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|c| !c.hidden)
            .filter(|c| c.key != MISC_CATEGORY || !c.fields.is_empty())
            .map(|c| c.title.clone())
            .collect()
    }

    pub fn to_flat(&self) -> FlatMap {
        let mut flat = FlatMap::new();
        for category in &self.categories {
            for (key, value) in &category.fields {
                flat.insert(key.clone(), value.clone());
            }
        }
        flat
    }
}

/// Total and exclusive; `misc` catches the rest.
pub fn categorize(flat: &FlatMap, pair: &SchemaPair) -> FormModel {
    let mut remaining = flat.clone();
    let mut model = FormModel::default();

    for schema_cat in categories(pair) {
        let mut fields = Vec::new();
        for declared in &schema_cat.fields {
            if let Some(value) = remaining.remove(declared) {
                fields.push((declared.clone(), value));
            }
        }
        model.categories.push(FormCategory {
            key: schema_cat.key,
            title: schema_cat.title,
            hidden: schema_cat.hidden,
            fields,
        });
    }

    let misc: Vec<(String, Value)> = remaining.into_iter().collect();
    model.categories.push(FormCategory {
        key: MISC_CATEGORY.to_string(),
        title: "Misc".to_string(),
        hidden: false,
        fields: misc,
    });
    model
}

/// Every schema-declared field that is empty/undefined takes the schema's
/// default, else a type-safe zero value. Never applied at load time.
pub fn apply_defaults(model: &mut FormModel, pair: &SchemaPair) {
    for schema_cat in categories(pair) {
        let field_schemas = pair
            .schema
            .get("properties")
            .and_then(|p| p.get(&schema_cat.key))
            .and_then(|c| c.get("properties"))
            .cloned()
            .unwrap_or(Value::Null);

        let Some(cat) = model.categories.iter_mut().find(|c| c.key == schema_cat.key) else {
            continue;
        };
        for declared in &schema_cat.fields {
            let field_schema = field_schemas.get(declared).unwrap_or(&Value::Null);
            match cat.fields.iter_mut().find(|(name, _)| name == declared) {
                Some((_, value)) => {
                    if is_empty(value) {
                        *value = default_for(field_schema);
                    }
                }
                None => {
                    cat.fields
                        .push((declared.clone(), default_for(field_schema)));
                }
            }
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

fn default_for(field_schema: &Value) -> Value {
    if let Some(default) = field_schema.get("default") {
        if !default.is_null() {
            return default.clone();
        }
    }
    match field_schema.get("type").and_then(Value::as_str) {
        Some("boolean") => Value::Bool(false),
        Some("integer") | Some("number") => Value::from(0),
        Some("array") => Value::Array(Vec::new()),
        Some("object") => Value::Object(serde_json::Map::new()),
        _ => Value::String(String::new()),
    }
}
