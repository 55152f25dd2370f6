pub mod ai;
pub mod assistant;
pub mod nlu;
pub mod responder;
pub mod speech;
pub mod store;
pub mod voice;
