//! Input validation for the write and read surfaces
//!
//! Bad input is reported as a user-facing error before any side effect; the
//! engine never sees empty content or malformed ids.

use anyhow::{anyhow, Result};

/// Maximum lengths for safety
pub const MAX_CONTENT_LENGTH: usize = 50_000; // 50KB
pub const MAX_QUERY_LENGTH: usize = 2_000;
pub const MAX_TAG_LENGTH: usize = 64;
pub const MAX_TAGS_PER_MEMORY: usize = 20;
pub const MAX_PROJECT_LENGTH: usize = 256;

/// Validate content to memorize
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(anyhow!("content cannot be empty"));
    }

    if content.len() > MAX_CONTENT_LENGTH {
        return Err(anyhow!(
            "content too long: {} bytes (max: {})",
            content.len(),
            MAX_CONTENT_LENGTH
        ));
    }

    Ok(())
}

/// Validate a recall query
pub fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(anyhow!("query cannot be empty"));
    }

    if query.len() > MAX_QUERY_LENGTH {
        return Err(anyhow!(
            "query too long: {} bytes (max: {})",
            query.len(),
            MAX_QUERY_LENGTH
        ));
    }

    Ok(())
}

/// Validate a memory id (UUID format)
pub fn validate_memory_id(memory_id: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(memory_id.trim())
        .map_err(|e| anyhow!("invalid memory id '{memory_id}': {e}"))
}

/// Validate caller-supplied tags
pub fn validate_tags(tags: &[String]) -> Result<()> {
    if tags.len() > MAX_TAGS_PER_MEMORY {
        return Err(anyhow!(
            "too many tags: {} (max: {})",
            tags.len(),
            MAX_TAGS_PER_MEMORY
        ));
    }

    for tag in tags {
        if tag.trim().is_empty() {
            return Err(anyhow!("tags cannot be empty"));
        }
        if tag.len() > MAX_TAG_LENGTH {
            return Err(anyhow!("tag too long: '{tag}' (max: {MAX_TAG_LENGTH})"));
        }
    }

    Ok(())
}

/// Validate a project name
pub fn validate_project(project: &str) -> Result<()> {
    if project.trim().is_empty() {
        return Err(anyhow!("project cannot be empty"));
    }
    if project.len() > MAX_PROJECT_LENGTH {
        return Err(anyhow!(
            "project name too long: {} bytes (max: {})",
            project.len(),
            MAX_PROJECT_LENGTH
        ));
    }

    Ok(())
}
