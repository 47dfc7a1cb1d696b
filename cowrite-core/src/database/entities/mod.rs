pub mod projects;
pub mod project_members;

// Project graph captured by backups
pub mod audio_assets;
pub mod character_stats;
pub mod characters;
pub mod document_comments;
pub mod document_versions;
pub mod documents;
pub mod plot_points;
pub mod plots;
pub mod reader_predictions;
pub mod relationships;
pub mod research_items;
pub mod storyboards;
pub mod translations;
pub mod world_settings;
pub mod writing_goals;

pub mod media_assets;
