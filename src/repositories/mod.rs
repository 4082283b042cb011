pub mod search_repository;
pub mod storage_repository;
