//! Serializes a collection in rank order.

use insertion_ranking_buffers::Writer;

use crate::collection::RankedCollection;
use crate::constants::{FORMAT_VERSION, MAGIC};
use crate::value::Value;

pub(crate) fn encode(collection: &RankedCollection, writer: &mut Writer) {
    if collection.options.write_header {
        writer.buf(&MAGIC);
        writer.u32(FORMAT_VERSION);
    }
    let arity = collection.factor_arity();
    writer.i32(arity as i32);
    writer.i32(collection.len() as i32);
    for element in collection {
        writer.i64(element.key());
        for factor in element.sort_key().leading(arity) {
            writer.f64(*factor);
        }
        let values = element.values();
        writer.i32(values.len() as i32);
        for value in values {
            write_value(writer, value);
        }
    }
}

fn write_value(writer: &mut Writer, value: &Value) {
    writer.i32(value.tag() as i32);
    match value {
        Value::Absent | Value::Null => {}
        Value::Boolean(b) => writer.i64(*b as i64),
        Value::Integer(i) => writer.i64(*i),
        Value::Float(f) => writer.f64(*f),
        Value::String(s) => {
            writer.i64(s.len() as i64);
            writer.buf(s.as_bytes());
        }
    }
}
