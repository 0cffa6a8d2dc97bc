//! The single project-authorization check used by every project-scoped
//! operation. Membership passes when the user appears in the members array,
//! is the legacy creator, or holds the system_admin role.

use bson::oid::ObjectId;
use dagboek_db::models::{MemberRole, Project, UserRole};

use crate::dao::base::{DaoError, DaoResult};

pub fn is_member(project: &Project, user_id: ObjectId) -> bool {
    project.members.iter().any(|m| m.user == user_id) || project.user == Some(user_id)
}

pub fn member_role(project: &Project, user_id: ObjectId) -> Option<MemberRole> {
    project
        .members
        .iter()
        .find(|m| m.user == user_id)
        .map(|m| m.role)
}

pub fn ensure_member(
    project: &Project,
    user_id: ObjectId,
    user_role: UserRole,
) -> DaoResult<()> {
    if user_role == UserRole::SystemAdmin || is_member(project, user_id) {
        return Ok(());
    }
    Err(DaoError::Forbidden(
        "User is not a member of this project".to_string(),
    ))
}

/// Member management requires owner or admin membership.
pub fn ensure_manager(
    project: &Project,
    user_id: ObjectId,
    user_role: UserRole,
) -> DaoResult<()> {
    if user_role == UserRole::SystemAdmin {
        return Ok(());
    }
    match member_role(project, user_id) {
        Some(MemberRole::Owner) | Some(MemberRole::Admin) => Ok(()),
        Some(MemberRole::Member) => Err(DaoError::Forbidden(
            "Requires project owner or admin".to_string(),
        )),
        None if project.user == Some(user_id) => Ok(()),
        None => Err(DaoError::Forbidden(
            "User is not a member of this project".to_string(),
        )),
    }
}
