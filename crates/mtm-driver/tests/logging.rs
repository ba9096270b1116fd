use log::{Level, LevelFilter, Log, Metadata, Record};
use mtm_diagnostics::ErrorHandler;
use mtm_driver::Compiler;
use mtm_source::SourceFile;
use std::sync::Mutex;

struct Capture(Mutex<Vec<(Level, String)>>);

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.0.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

#[test]
fn type_diagnostics_are_logged_once() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let output = Compiler::default().compile(
        &SourceFile::new("Title.mtm", "$title: string = 42\n"),
        &mut ErrorHandler::new(),
    );
    assert_eq!(output.diagnostics.len(), 1);

    let records = CAPTURE.0.lock().unwrap();
    let warnings: Vec<&String> = records
        .iter()
        .filter(|(level, message)| *level == Level::Warn && message.contains("Type mismatch for '$title'"))
        .map(|(_, message)| message)
        .collect();
    assert_eq!(warnings.len(), 1, "{:?}", warnings);
}
