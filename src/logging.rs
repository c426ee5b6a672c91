use chrono::{SecondsFormat, Utc};
use env_logger::{Builder, Logger, Target};
use log::kv::{self, Key, VisitSource};
use log::{LevelFilter, Record};
use serde_json::{Map, Value};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Builds the diagnostics logger. It always writes to stderr so the report on
/// stdout stays clean, and it is handed to the pipeline rather than installed
/// globally. Only the global max level is touched.
pub fn build_logger(format: LogFormat, level: LevelFilter) -> Logger {
    let mut builder = Builder::new();
    builder.filter_level(level).target(Target::Stderr);
    if format == LogFormat::Json {
        builder.format(|buf, record| {
            serde_json::to_writer(&mut *buf, &json_fields(record)).map_err(io::Error::from)?;
            writeln!(buf)
        });
    }
    log::set_max_level(level);
    builder.build()
}

/// Fields written for every record. Record key-values never replace them.
const RESERVED_KEYS: [&str; 4] = ["time", "level", "target", "msg"];

/// One JSON object per record: the reserved fields plus the record's
/// key-values. Keys serialize in sorted order.
pub fn json_fields(record: &Record<'_>) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(
        "time".to_string(),
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true).into(),
    );
    fields.insert("level".to_string(), record.level().as_str().into());
    fields.insert("target".to_string(), record.target().into());
    fields.insert("msg".to_string(), record.args().to_string().into());
    let _ = record.key_values().visit(&mut JsonVisitor(&mut fields));
    fields
}

struct JsonVisitor<'a>(&'a mut Map<String, Value>);

impl<'kvs> VisitSource<'kvs> for JsonVisitor<'_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: kv::Value<'kvs>) -> Result<(), kv::Error> {
        let json = if let Some(n) = value.to_u64() {
            Value::from(n)
        } else if let Some(n) = value.to_i64() {
            Value::from(n)
        } else if let Some(b) = value.to_bool() {
            Value::from(b)
        } else {
            Value::from(value.to_string())
        };
        if !RESERVED_KEYS.contains(&key.as_str()) {
            self.0.insert(key.as_str().to_string(), json);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod capture {
    use log::kv::{self, Key, VisitSource};
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::Mutex;

    /// Keeps every record as `LEVEL msg key=value ...` for assertions.
    pub struct CaptureLog {
        lines: Mutex<Vec<(Level, String)>>,
    }

    impl CaptureLog {
        pub fn new() -> Self {
            log::set_max_level(LevelFilter::Trace);
            Self {
                lines: Mutex::new(Vec::new()),
            }
        }

        pub fn lines(&self) -> Vec<(Level, String)> {
            self.lines.lock().unwrap().clone()
        }

        pub fn warnings(&self) -> Vec<String> {
            self.lines()
                .into_iter()
                .filter(|(level, _)| *level == Level::Warn)
                .map(|(_, line)| line)
                .collect()
        }
    }

    struct Pairs<'a>(&'a mut String);

    impl<'kvs> VisitSource<'kvs> for Pairs<'_> {
        fn visit_pair(&mut self, key: Key<'kvs>, value: kv::Value<'kvs>) -> Result<(), kv::Error> {
            self.0.push_str(&format!(" {key}={value}"));
            Ok(())
        }
    }

    impl Log for CaptureLog {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            let mut line = record.args().to_string();
            let _ = record.key_values().visit(&mut Pairs(&mut line));
            self.lines.lock().unwrap().push((record.level(), line));
        }

        fn flush(&self) {}
    }
}
