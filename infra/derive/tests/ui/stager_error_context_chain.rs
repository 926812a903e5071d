use stager_derive::stager_error;
use std::borrow::Cow;

#[stager_error]
pub enum LoadError {
    #[error("Stylesheet failed{}: {message}", format_context(.context))]
    Stylesheet { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), LoadError> {
    Err(std::io::Error::other("eof")).context("Reading stylesheet")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (Reading stylesheet): eof");

    let err: Result<(), LoadError> =
        Err(LoadError::Stylesheet { message: "/main.css".into(), context: None });
    let err = err.context("Styles phase").unwrap_err();
    assert_eq!(err.to_string(), "Stylesheet failed (Styles phase): /main.css");
}
