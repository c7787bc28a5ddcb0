//! Role-to-permission mapping.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use learnhub_entity::user::Role;

/// An operation family guarded by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Create and edit courses and sessions.
    #[serde(rename = "courses.manage")]
    CoursesManage,
    /// Manage automation rules.
    #[serde(rename = "automation.manage")]
    AutomationManage,
    /// Browse and download library documents.
    #[serde(rename = "documents.view")]
    DocumentsView,
    /// Upload, edit and delete documents and folders.
    #[serde(rename = "documents.manage")]
    DocumentsManage,
    /// Author questionnaires.
    #[serde(rename = "questionnaires.manage")]
    QuestionnairesManage,
    /// Author quizzes and grade attempts.
    #[serde(rename = "quizzes.manage")]
    QuizzesManage,
    /// Start and submit quiz attempts.
    #[serde(rename = "quizzes.take")]
    QuizzesTake,
    /// Manage companies and funders.
    #[serde(rename = "partners.manage")]
    PartnersManage,
    /// Download CSV and spreadsheet exports.
    #[serde(rename = "exports.run")]
    ExportsRun,
    /// Read organization statistics.
    #[serde(rename = "statistics.view")]
    StatisticsView,
}

impl Permission {
    /// Every permission.
    pub const ALL: [Permission; 10] = [
        Self::CoursesManage,
        Self::AutomationManage,
        Self::DocumentsView,
        Self::DocumentsManage,
        Self::QuestionnairesManage,
        Self::QuizzesManage,
        Self::QuizzesTake,
        Self::PartnersManage,
        Self::ExportsRun,
        Self::StatisticsView,
    ];
}

/// Permissions granted to each role.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    policies: HashMap<Role, HashSet<Permission>>,
}

impl RbacPolicies {
    /// The default policy set.
    pub fn new() -> Self {
        let mut policies = HashMap::new();

        policies.insert(Role::Organization, Permission::ALL.into_iter().collect());

        let instructor: HashSet<Permission> = Permission::ALL
            .into_iter()
            .filter(|p| *p != Permission::PartnersManage)
            .collect();
        policies.insert(Role::Instructor, instructor);

        policies.insert(
            Role::Member,
            [Permission::DocumentsView, Permission::QuizzesTake].into_iter().collect(),
        );

        policies.insert(Role::Guest, HashSet::new());

        Self { policies }
    }

    /// Permissions of `role`.
    pub fn permissions_for_role(&self, role: Role) -> HashSet<Permission> {
        self.policies.get(&role).cloned().unwrap_or_default()
    }

    /// Whether `role` holds `permission`.
    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.policies
            .get(&role)
            .is_some_and(|perms| perms.contains(&permission))
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}
