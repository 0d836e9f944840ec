pub mod extract;
pub mod handlers;
pub mod matcher;
pub mod payload;
pub mod report;
pub mod skills;
pub mod storage;
