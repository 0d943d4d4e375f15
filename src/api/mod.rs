pub mod dto;

pub use dto::{ProjectContentResponseDto, ProjectResponseDto};
