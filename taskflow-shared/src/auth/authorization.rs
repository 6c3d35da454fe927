/// Authorization engine
///
/// Decides whether an actor may perform an [`Action`] on a [`Resource`].
/// Decisions depend only on the actor's roles and on team membership, read
/// through [`MembershipQueries`] on every call.
///
/// # Rule order
///
/// For every resource the checks run in a fixed order, and the first failing
/// check decides the outcome:
///
/// 1. No actor: [`Denial::Unauthenticated`]
/// 2. Missing or blank required input: [`Denial::ValidationFailed`]
/// 3. Referenced row absent: [`Denial::NotFound`]
/// 4. Role or membership requirement unmet: [`Denial::Forbidden`]
///
/// Team updates, team membership changes and role assignment have no required
/// input beyond ids, so they go straight from 1 to 3.
///
/// # Rules
///
/// | Resource | Action | Requirement |
/// |---|---|---|
/// | Team | Create | `admin` or `manager` |
/// | Team | Read | any actor; 404 for an unknown id |
/// | Team | Update, Delete | `admin` |
/// | Project | Create | member of the team |
/// | Project, Task | Read | any actor; listings are scoped by the store |
/// | Task | Create | member of the team; an explicit assignee must be a member too |
/// | Comment | Create, Read | member of the task's team |
/// | TeamMembers | Create, Delete | `admin` or `team-admin` |
/// | UserRoles | Update | `admin` |
///
/// Everything else is forbidden.
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::auth::authorization::{require, Action, Resource};
/// use taskflow_shared::auth::middleware::Actor;
/// use taskflow_shared::store::memory::MemoryStore;
/// use uuid::Uuid;
///
/// # async fn example(store: MemoryStore, actor: Option<Actor>, team_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let actor = require(
///     &store,
///     actor.as_ref(),
///     Action::Create,
///     Resource::Project { team_id: Some(team_id), name: Some("Roadmap") },
/// )
/// .await?;
/// println!("{} may create the project", actor.username);
/// # Ok(())
/// # }
/// ```

use std::fmt;
use uuid::Uuid;

use super::middleware::Actor;
use crate::models::role::Role;
use crate::store::{MembershipQueries, StoreError};

/// Operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// The target of an action, with the request input the rules inspect
///
/// Optional fields model input that may be absent from a request; the engine
/// reports their absence as a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource<'a> {
    /// A team, or the team collection when `id` is `None`
    Team {
        id: Option<Uuid>,
        name: Option<&'a str>,
    },
    Project {
        team_id: Option<Uuid>,
        name: Option<&'a str>,
    },
    Task {
        project_id: Option<Uuid>,
        title: Option<&'a str>,
        assignee_id: Option<Uuid>,
    },
    Comment {
        task_id: Option<Uuid>,
        content: Option<&'a str>,
    },
    /// Membership of `user_id` in `team_id`
    TeamMembers { team_id: Uuid, user_id: Uuid },
    /// The role set of a user
    UserRoles { user_id: Uuid },
}

impl Resource<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Resource::Team { .. } => "team",
            Resource::Project { .. } => "project",
            Resource::Task { .. } => "task",
            Resource::Comment { .. } => "comment",
            Resource::TeamMembers { .. } => "team_members",
            Resource::UserRoles { .. } => "user_roles",
        }
    }
}

/// Why an action was denied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Forbidden(String),
    NotFound(String),
    ValidationFailed(String),
}

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn forbidden(reason: &str) -> Self {
        Decision::Deny(Denial::Forbidden(reason.to_string()))
    }

    fn not_found(reason: &str) -> Self {
        Decision::Deny(Denial::NotFound(reason.to_string()))
    }

    fn invalid(reason: &str) -> Self {
        Decision::Deny(Denial::ValidationFailed(reason.to_string()))
    }
}

/// Authorization failures, for `?` propagation
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("Authentication credentials were not provided")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<Denial> for AuthzError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => AuthzError::Unauthenticated,
            Denial::Forbidden(reason) => AuthzError::Forbidden(reason),
            Denial::NotFound(reason) => AuthzError::NotFound(reason),
            Denial::ValidationFailed(reason) => AuthzError::ValidationFailed(reason),
        }
    }
}

const NOT_PERMITTED: &str = "You do not have permission to perform this action.";

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Evaluates the rules for one action
///
/// Store failures are returned as errors, never as denials.
pub async fn authorize<Q>(
    queries: &Q,
    actor: Option<&Actor>,
    action: Action,
    resource: Resource<'_>,
) -> Result<Decision, StoreError>
where
    Q: MembershipQueries + ?Sized,
{
    let Some(actor) = actor else {
        return Ok(Decision::Deny(Denial::Unauthenticated));
    };

    let decision = match (resource, action) {
        (Resource::Team { name, .. }, Action::Create) => {
            if is_blank(name) {
                Decision::invalid("Team name is required.")
            } else if actor.roles.has_any(&[Role::Admin, Role::Manager]) {
                Decision::Allow
            } else {
                Decision::forbidden(NOT_PERMITTED)
            }
        }

        (Resource::Team { id: None, .. }, Action::Read) => Decision::Allow,

        (Resource::Team { id: Some(id), .. }, Action::Read) => {
            if queries.team_exists(id).await? {
                Decision::Allow
            } else {
                Decision::not_found("Team not found.")
            }
        }

        (Resource::Team { id, name }, Action::Update | Action::Delete) => match id {
            None => Decision::invalid("team id is required."),
            Some(id) if !queries.team_exists(id).await? => Decision::not_found("Team not found."),
            Some(_) if !actor.roles.has(Role::Admin) => Decision::forbidden(NOT_PERMITTED),
            Some(_) if action == Action::Update && name.is_some() && is_blank(name) => {
                Decision::invalid("Team name cannot be empty.")
            }
            Some(_) => Decision::Allow,
        },

        (Resource::Project { team_id, name }, Action::Create) => match team_id {
            Some(team_id) if !is_blank(name) => {
                if !queries.team_exists(team_id).await? {
                    Decision::not_found("Team not found.")
                } else if !queries.is_team_member(team_id, actor.user_id).await? {
                    Decision::forbidden("You must be a member of the team to create projects.")
                } else {
                    Decision::Allow
                }
            }
            _ => Decision::invalid("Project name and team_id are required."),
        },

        (Resource::Project { .. }, Action::Read) | (Resource::Task { .. }, Action::Read) => {
            Decision::Allow
        }

        (
            Resource::Task {
                project_id,
                title,
                assignee_id,
            },
            Action::Create,
        ) => match project_id {
            Some(project_id) if !is_blank(title) => {
                authorize_task_create(queries, actor, project_id, assignee_id).await?
            }
            _ => Decision::invalid("Task title and project_id are required."),
        },

        (Resource::Comment { task_id, content }, Action::Create) => match task_id {
            Some(task_id) if !is_blank(content) => {
                require_task_team_member(
                    queries,
                    actor,
                    task_id,
                    "You must be a member of the team to add comments.",
                )
                .await?
            }
            _ => Decision::invalid("Comment content and task_id are required."),
        },

        (Resource::Comment { task_id, .. }, Action::Read) => match task_id {
            Some(task_id) => {
                require_task_team_member(
                    queries,
                    actor,
                    task_id,
                    "You must be a member of the team to view comments.",
                )
                .await?
            }
            None => Decision::invalid("task_id is required."),
        },

        (Resource::TeamMembers { team_id, user_id }, Action::Create | Action::Delete) => {
            if !queries.team_exists(team_id).await? {
                Decision::not_found("Team not found.")
            } else if !queries.user_exists(user_id).await? {
                Decision::not_found("User not found.")
            } else if actor.roles.has_any(&[Role::Admin, Role::TeamAdmin]) {
                Decision::Allow
            } else {
                Decision::forbidden(NOT_PERMITTED)
            }
        }

        (Resource::UserRoles { user_id }, Action::Update) => {
            if !queries.user_exists(user_id).await? {
                Decision::not_found("User not found.")
            } else if actor.roles.has(Role::Admin) {
                Decision::Allow
            } else {
                Decision::forbidden(NOT_PERMITTED)
            }
        }

        _ => Decision::forbidden(NOT_PERMITTED),
    };

    match &decision {
        Decision::Allow => tracing::debug!(
            user_id = %actor.user_id,
            %action,
            resource = resource.kind(),
            "Authorization allowed"
        ),
        Decision::Deny(denial) => tracing::debug!(
            user_id = %actor.user_id,
            %action,
            resource = resource.kind(),
            ?denial,
            "Authorization denied"
        ),
    }

    Ok(decision)
}

async fn authorize_task_create<Q>(
    queries: &Q,
    actor: &Actor,
    project_id: Uuid,
    assignee_id: Option<Uuid>,
) -> Result<Decision, StoreError>
where
    Q: MembershipQueries + ?Sized,
{
    let Some(team_id) = queries.project_team(project_id).await? else {
        return Ok(Decision::not_found("Project not found."));
    };

    if !queries.is_team_member(team_id, actor.user_id).await? {
        return Ok(Decision::forbidden(
            "You must be a member of the team to create tasks.",
        ));
    }

    // With no explicit assignee the actor is assigned, and is already known to be a member.
    if let Some(assignee_id) = assignee_id {
        if !queries.user_exists(assignee_id).await? {
            return Ok(Decision::not_found("User not found."));
        }
        if !queries.is_team_member(team_id, assignee_id).await? {
            return Ok(Decision::invalid("Assignee must be a member of the team."));
        }
    }

    Ok(Decision::Allow)
}

async fn require_task_team_member<Q>(
    queries: &Q,
    actor: &Actor,
    task_id: Uuid,
    forbidden: &str,
) -> Result<Decision, StoreError>
where
    Q: MembershipQueries + ?Sized,
{
    let Some(team_id) = queries.task_team(task_id).await? else {
        return Ok(Decision::not_found("Task not found."));
    };

    if queries.is_team_member(team_id, actor.user_id).await? {
        Ok(Decision::Allow)
    } else {
        Ok(Decision::forbidden(forbidden))
    }
}

/// Like [`authorize`], but turns a denial into an error and hands back the actor
pub async fn require<'a, Q>(
    queries: &Q,
    actor: Option<&'a Actor>,
    action: Action,
    resource: Resource<'_>,
) -> Result<&'a Actor, AuthzError>
where
    Q: MembershipQueries + ?Sized,
{
    let actor = actor.ok_or(AuthzError::Unauthenticated)?;

    match authorize(queries, Some(actor), action, resource).await? {
        Decision::Allow => Ok(actor),
        Decision::Deny(denial) => Err(denial.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::Identity;
    use crate::models::project::NewProject;
    use crate::models::role::RoleSet;
    use crate::models::task::{status, NewTask};
    use crate::models::team::NewTeam;
    use crate::store::memory::MemoryStore;
    use crate::store::ResourceStore;

    struct Fixture {
        store: MemoryStore,
        team_id: Uuid,
        project_id: Uuid,
        task_id: Uuid,
        member: Actor,
        outsider: Actor,
    }

    async fn actor(store: &MemoryStore, email: &str, roles: &[Role]) -> Actor {
        let user = store
            .resolve_or_create(&Identity::new(email, "", ""))
            .await
            .unwrap();
        Actor {
            user_id: user.id,
            username: user.username,
            roles: roles.iter().copied().collect::<RoleSet>(),
        }
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let member = actor(&store, "user@example.com", &[Role::Regular]).await;
        let outsider = actor(&store, "nonmember@example.com", &[Role::Regular]).await;

        let team = store
            .create_team(NewTeam {
                name: "Test Team".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        store.add_team_member(team.id, member.user_id).await.unwrap();

        let project = store
            .create_project(NewProject {
                name: "Test Project".to_string(),
                description: String::new(),
                team_id: team.id,
            })
            .await
            .unwrap();
        let task = store
            .create_task(NewTask {
                title: "Test Task".to_string(),
                description: String::new(),
                project_id: project.id,
                status: status::DEFAULT.to_string(),
                assignee_id: member.user_id,
            })
            .await
            .unwrap();

        Fixture {
            store,
            team_id: team.id,
            project_id: project.id,
            task_id: task.id,
            member,
            outsider,
        }
    }

    fn denial(decision: Decision) -> Denial {
        match decision {
            Decision::Deny(denial) => denial,
            Decision::Allow => panic!("expected a denial"),
        }
    }

    #[tokio::test]
    async fn test_no_actor_is_unauthenticated_for_everything() {
        let f = fixture().await;
        let resources = [
            Resource::Team { id: None, name: Some("x") },
            Resource::Project { team_id: Some(f.team_id), name: Some("x") },
            Resource::Task { project_id: None, title: None, assignee_id: None },
            Resource::Comment { task_id: Some(f.task_id), content: Some("x") },
            Resource::UserRoles { user_id: f.member.user_id },
        ];

        for resource in resources {
            for action in [Action::Create, Action::Read, Action::Update, Action::Delete] {
                let decision = authorize(&f.store, None, action, resource).await.unwrap();
                assert_eq!(decision, Decision::Deny(Denial::Unauthenticated));
            }
        }
    }

    #[tokio::test]
    async fn test_team_create_requires_admin_or_manager() {
        let f = fixture().await;
        let resource = Resource::Team { id: None, name: Some("New Team") };

        let regular = authorize(&f.store, Some(&f.member), Action::Create, resource).await.unwrap();
        assert!(matches!(denial(regular), Denial::Forbidden(_)));

        for role in [Role::Admin, Role::Manager] {
            let a = actor(&f.store, &format!("{role}@example.com"), &[role]).await;
            let decision = authorize(&f.store, Some(&a), Action::Create, resource).await.unwrap();
            assert_eq!(decision, Decision::Allow);
        }

        let team_admin = actor(&f.store, "ta@example.com", &[Role::TeamAdmin]).await;
        let decision = authorize(&f.store, Some(&team_admin), Action::Create, resource)
            .await
            .unwrap();
        assert!(!decision.is_allowed());
    }

    #[tokio::test]
    async fn test_team_create_validation_precedes_role_check() {
        let f = fixture().await;
        for name in [None, Some(""), Some("   ")] {
            let decision = authorize(
                &f.store,
                Some(&f.member),
                Action::Create,
                Resource::Team { id: None, name },
            )
            .await
            .unwrap();
            assert_eq!(
                denial(decision),
                Denial::ValidationFailed("Team name is required.".to_string())
            );
        }
    }

    #[tokio::test]
    async fn test_team_read_and_unknown_team() {
        let f = fixture().await;

        let list = Resource::Team { id: None, name: None };
        assert!(authorize(&f.store, Some(&f.outsider), Action::Read, list).await.unwrap().is_allowed());

        let detail = Resource::Team { id: Some(f.team_id), name: None };
        assert!(authorize(&f.store, Some(&f.outsider), Action::Read, detail).await.unwrap().is_allowed());

        let missing = Resource::Team { id: Some(Uuid::new_v4()), name: None };
        let decision = authorize(&f.store, Some(&f.member), Action::Read, missing).await.unwrap();
        assert!(matches!(denial(decision), Denial::NotFound(_)));
    }

    #[tokio::test]
    async fn test_team_update_delete_admin_only() {
        let f = fixture().await;
        let manager = actor(&f.store, "manager@example.com", &[Role::Manager]).await;
        let admin = actor(&f.store, "admin@example.com", &[Role::Admin]).await;
        let team = Resource::Team { id: Some(f.team_id), name: None };

        for action in [Action::Update, Action::Delete] {
            let d = authorize(&f.store, Some(&manager), action, team).await.unwrap();
            assert!(matches!(denial(d), Denial::Forbidden(_)));
            assert!(authorize(&f.store, Some(&admin), action, team).await.unwrap().is_allowed());

            let missing = Resource::Team { id: Some(Uuid::new_v4()), name: None };
            let d = authorize(&f.store, Some(&admin), action, missing).await.unwrap();
            assert!(matches!(denial(d), Denial::NotFound(_)));
        }

        let blank = Resource::Team { id: Some(f.team_id), name: Some("") };
        let d = authorize(&f.store, Some(&admin), Action::Update, blank).await.unwrap();
        assert!(matches!(denial(d), Denial::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_project_create_allowed_iff_member() {
        let f = fixture().await;
        let resource = Resource::Project { team_id: Some(f.team_id), name: Some("P2") };

        assert!(authorize(&f.store, Some(&f.member), Action::Create, resource).await.unwrap().is_allowed());

        let d = authorize(&f.store, Some(&f.outsider), Action::Create, resource).await.unwrap();
        assert_eq!(
            denial(d),
            Denial::Forbidden("You must be a member of the team to create projects.".to_string())
        );

        // Roles do not substitute for membership
        let admin = actor(&f.store, "admin@example.com", &Role::ALL).await;
        let d = authorize(&f.store, Some(&admin), Action::Create, resource).await.unwrap();
        assert!(matches!(denial(d), Denial::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_project_create_validation_then_not_found() {
        let f = fixture().await;

        let d = authorize(
            &f.store,
            Some(&f.member),
            Action::Create,
            Resource::Project { team_id: Some(f.team_id), name: None },
        )
        .await
        .unwrap();
        assert_eq!(
            denial(d),
            Denial::ValidationFailed("Project name and team_id are required.".to_string())
        );

        let d = authorize(
            &f.store,
            Some(&f.member),
            Action::Create,
            Resource::Project { team_id: Some(Uuid::new_v4()), name: Some("P") },
        )
        .await
        .unwrap();
        assert!(matches!(denial(d), Denial::NotFound(_)));
    }

    #[tokio::test]
    async fn test_task_create_rules() {
        let f = fixture().await;
        let task = |project_id, assignee_id| Resource::Task {
            project_id: Some(project_id),
            title: Some("Do it"),
            assignee_id,
        };

        // Member, implicit assignee
        let d = authorize(&f.store, Some(&f.member), Action::Create, task(f.project_id, None)).await.unwrap();
        assert!(d.is_allowed());

        // Non-member actor
        let d = authorize(&f.store, Some(&f.outsider), Action::Create, task(f.project_id, None)).await.unwrap();
        assert_eq!(
            denial(d),
            Denial::Forbidden("You must be a member of the team to create tasks.".to_string())
        );

        // Assignee outside the team is a validation failure
        let d = authorize(
            &f.store,
            Some(&f.member),
            Action::Create,
            task(f.project_id, Some(f.outsider.user_id)),
        )
        .await
        .unwrap();
        assert_eq!(
            denial(d),
            Denial::ValidationFailed("Assignee must be a member of the team.".to_string())
        );

        // Unknown assignee
        let d = authorize(
            &f.store,
            Some(&f.member),
            Action::Create,
            task(f.project_id, Some(Uuid::new_v4())),
        )
        .await
        .unwrap();
        assert!(matches!(denial(d), Denial::NotFound(_)));

        // Unknown project, even for an actor holding every role
        let admin = actor(&f.store, "admin@example.com", &Role::ALL).await;
        let d = authorize(&f.store, Some(&admin), Action::Create, task(Uuid::new_v4(), None)).await.unwrap();
        assert_eq!(denial(d), Denial::NotFound("Project not found.".to_string()));

        // Missing title
        let d = authorize(
            &f.store,
            Some(&f.member),
            Action::Create,
            Resource::Task { project_id: Some(f.project_id), title: None, assignee_id: None },
        )
        .await
        .unwrap();
        assert!(matches!(denial(d), Denial::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_comment_create_allowed_iff_task_team_member() {
        let f = fixture().await;
        let comment = Resource::Comment { task_id: Some(f.task_id), content: Some("Looks good") };

        assert!(authorize(&f.store, Some(&f.member), Action::Create, comment).await.unwrap().is_allowed());

        let d = authorize(&f.store, Some(&f.outsider), Action::Create, comment).await.unwrap();
        assert_eq!(
            denial(d),
            Denial::Forbidden("You must be a member of the team to add comments.".to_string())
        );

        let empty = Resource::Comment { task_id: Some(f.task_id), content: Some("") };
        let d = authorize(&f.store, Some(&f.member), Action::Create, empty).await.unwrap();
        assert!(matches!(denial(d), Denial::ValidationFailed(_)));

        let missing = Resource::Comment { task_id: Some(Uuid::new_v4()), content: Some("hi") };
        let d = authorize(&f.store, Some(&f.member), Action::Create, missing).await.unwrap();
        assert_eq!(denial(d), Denial::NotFound("Task not found.".to_string()));
    }

    #[tokio::test]
    async fn test_comment_read_requires_membership() {
        let f = fixture().await;
        let comments = Resource::Comment { task_id: Some(f.task_id), content: None };

        assert!(authorize(&f.store, Some(&f.member), Action::Read, comments).await.unwrap().is_allowed());
        let d = authorize(&f.store, Some(&f.outsider), Action::Read, comments).await.unwrap();
        assert_eq!(
            denial(d),
            Denial::Forbidden("You must be a member of the team to view comments.".to_string())
        );
    }

    #[tokio::test]
    async fn test_listings_always_allowed() {
        let f = fixture().await;
        for resource in [
            Resource::Project { team_id: None, name: None },
            Resource::Task { project_id: None, title: None, assignee_id: None },
        ] {
            let d = authorize(&f.store, Some(&f.outsider), Action::Read, resource).await.unwrap();
            assert!(d.is_allowed());
        }
    }

    #[tokio::test]
    async fn test_team_members_require_admin_or_team_admin() {
        let f = fixture().await;
        let resource = Resource::TeamMembers { team_id: f.team_id, user_id: f.outsider.user_id };
        let team_admin = actor(&f.store, "ta@example.com", &[Role::TeamAdmin]).await;
        let manager = actor(&f.store, "mgr@example.com", &[Role::Manager]).await;

        for action in [Action::Create, Action::Delete] {
            assert!(authorize(&f.store, Some(&team_admin), action, resource).await.unwrap().is_allowed());
            let d = authorize(&f.store, Some(&manager), action, resource).await.unwrap();
            assert!(matches!(denial(d), Denial::Forbidden(_)));
        }

        let unknown_user = Resource::TeamMembers { team_id: f.team_id, user_id: Uuid::new_v4() };
        let d = authorize(&f.store, Some(&team_admin), Action::Create, unknown_user).await.unwrap();
        assert_eq!(denial(d), Denial::NotFound("User not found.".to_string()));
    }

    #[tokio::test]
    async fn test_user_roles_admin_only() {
        let f = fixture().await;
        let admin = actor(&f.store, "admin@example.com", &[Role::Admin]).await;
        let resource = Resource::UserRoles { user_id: f.member.user_id };

        assert!(authorize(&f.store, Some(&admin), Action::Update, resource).await.unwrap().is_allowed());
        let d = authorize(&f.store, Some(&f.member), Action::Update, resource).await.unwrap();
        assert!(matches!(denial(d), Denial::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_unsupported_combinations_forbidden() {
        let f = fixture().await;
        let admin = actor(&f.store, "admin@example.com", &Role::ALL).await;

        for (action, resource) in [
            (Action::Delete, Resource::Project { team_id: Some(f.team_id), name: None }),
            (Action::Update, Resource::Task { project_id: None, title: None, assignee_id: None }),
            (Action::Read, Resource::UserRoles { user_id: admin.user_id }),
        ] {
            let d = authorize(&f.store, Some(&admin), action, resource).await.unwrap();
            assert!(matches!(denial(d), Denial::Forbidden(_)));
        }
    }

    #[tokio::test]
    async fn test_require_maps_denials_to_errors() {
        let f = fixture().await;

        let err = require(&f.store, None, Action::Read, Resource::Team { id: None, name: None })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Unauthenticated));

        let ok = require(
            &f.store,
            Some(&f.member),
            Action::Read,
            Resource::Team { id: None, name: None },
        )
        .await
        .unwrap();
        assert_eq!(ok.user_id, f.member.user_id);

        let err = require(
            &f.store,
            Some(&f.outsider),
            Action::Read,
            Resource::Comment { task_id: Some(f.task_id), content: None },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden(_)));
    }
}
