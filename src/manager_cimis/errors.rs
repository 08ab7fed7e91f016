use thiserror::Error;

#[derive(Error, Debug)]
#[error("error reading CIMIS observations: {0}")]
pub struct CimisError(pub String);
impl From<csv::Error> for CimisError {
    fn from(e: csv::Error) -> CimisError {
        CimisError(format!("csv error: {}", e))
    }
}
impl From<std::io::Error> for CimisError {
    fn from(e: std::io::Error) -> CimisError {
        CimisError(format!("io error: {}", e))
    }
}
