use blendoc_core::blend::{FieldValue, Record};

/// Pretty-print any serializable value as JSON.
pub(crate) fn emit_json<T: serde::Serialize>(value: &T) {
	let rendered = serde_json::to_string_pretty(value).expect("json serialization should succeed");
	println!("{rendered}");
}

/// Render pointer as fixed-width hex string.
pub(crate) fn ptr_hex(value: u64) -> String {
	format!("0x{value:016x}")
}

/// One-line human-readable rendering of a decoded field value.
pub(crate) fn render_value(value: &FieldValue) -> String {
	match value {
		FieldValue::F32(v) => v.to_string(),
		FieldValue::F64(v) => v.to_string(),
		FieldValue::Int(v) => v.to_string(),
		FieldValue::UInt(v) => v.to_string(),
		FieldValue::String(s) => format!("{s:?}"),
		FieldValue::Bytes(b) => format!("<{} bytes>", b.len()),
		FieldValue::Pointer(addr) => ptr_hex(*addr),
		FieldValue::Array(items) => {
			let rendered: Vec<String> = items.iter().map(render_value).collect();
			format!("[{}]", rendered.join(", "))
		}
		FieldValue::Struct(record) => format!("{{{}}}", record.type_name()),
	}
}

/// Convert a decoded field value into a JSON value, resolving nothing
/// further; pointers are rendered as their hex address.
pub(crate) fn value_to_json(value: &FieldValue) -> serde_json::Value {
	match value {
		FieldValue::F32(v) => serde_json::json!(v),
		FieldValue::F64(v) => serde_json::json!(v),
		FieldValue::Int(v) => serde_json::json!(v),
		FieldValue::UInt(v) => serde_json::json!(v),
		FieldValue::String(s) => serde_json::json!(s),
		FieldValue::Bytes(b) => serde_json::json!(format!("<{} bytes>", b.len())),
		FieldValue::Pointer(addr) => serde_json::json!(ptr_hex(*addr)),
		FieldValue::Array(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
		FieldValue::Struct(record) => record_to_json(record),
	}
}

/// Convert a record's full field list into a JSON object keyed by field name.
pub(crate) fn record_to_json(record: &Record) -> serde_json::Value {
	let mut map = serde_json::Map::new();
	map.insert("type".to_owned(), serde_json::json!(record.type_name()));
	let mut fields = serde_json::Map::new();
	for field in &record.decoder().fields {
		if let Ok(value) = record.field(&field.name) {
			fields.insert(field.name.to_string(), value_to_json(&value));
		}
	}
	map.insert("fields".to_owned(), serde_json::Value::Object(fields));
	serde_json::Value::Object(map)
}
