pub mod generator;
pub mod history;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use generator::ResponseGenerator;
pub use history::Turn;
pub use session::ChatSession;
