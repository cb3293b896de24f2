/// Logs an unrecoverable condition at error level and panics.
macro_rules! fatal {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        log::error!("{}", message);
        panic!("{}", message);
    }};
}
