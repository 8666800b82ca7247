pub mod posting_dto;
