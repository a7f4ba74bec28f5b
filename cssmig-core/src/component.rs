//! Heuristic component attribution.
//!
//! Labels each class with the UI component that most likely owns it. The chain
//! below is evaluated in strict order on the lower-cased class name and stops
//! at the first stage that produces a label:
//!
//! 1. exact lookup in the name table
//! 2. infix families (`modal`, `import-step`, `stage-form`) with nested variants
//! 3. prefix families (`btn…`)
//! 4. substring containment against the name table
//! 5. keyword → PascalCase synthesis
//! 6. selector containment against the name table
//! 7. path-fragment hints found in selectors
//! 8. [`UNKNOWN_COMPONENT`]
//!
//! The labels are a review aid, not ground truth.

use std::collections::BTreeSet;

use crate::config::CssmigConfig;

/// Sentinel label when no stage matched.
pub const UNKNOWN_COMPONENT: &str = "Unknown";

const DEFAULT_EXACT: &[(&str, &str)] = &[
    // Modals
    ("modal", "Modal"),
    ("simple-modal", "SimpleModal"),
    ("form-modal", "FormModal"),
    ("app-modal", "AppModal"),
    ("wide-modal", "WideModal"),
    ("narrow-modal", "NarrowModal"),
    ("error-modal", "ErrorModal"),
    ("message-modal", "MessageModal"),
    ("account-modal", "AccountModal"),
    ("accounts-modal", "AccountsModal"),
    ("project-modal", "ProjectModal"),
    ("projects-modal", "ProjectsModal"),
    ("user-modal", "UserModal"),
    ("users-modal", "UsersModal"),
    ("login-modal", "LoginModal"),
    ("register-modal", "RegisterModal"),
    ("text-prompt-modal", "TextPromptModal"),
    ("yesno-modal", "YesNoModal"),
    ("jobs-modal", "JobsModal"),
    ("documents-modal", "DocumentsModal"),
    ("history-modal", "HistoryModal"),
    ("document-item-history-modal", "DocumentItemHistoryModal"),
    ("password-reset-modal", "PasswordResetModal"),
    ("corpus-filter-modal", "CorpusFilterModal"),
    ("choose-content-modal", "ChooseContentForAIModal"),
    ("import-wizard-modal", "QuestionImportModal"),
    ("duplicate-permissions-modal", "DuplicatePermissionsModal"),
    ("add-corpus-permission-modal", "AddCorpusPermissionModal"),
    ("add-docchain-permission-modal", "AddDocchainPermissionModal"),
    // Buttons and controls
    ("btn", "Button"),
    ("btn-primary", "PrimaryButton"),
    ("btn-secondary", "SecondaryButton"),
    ("btn-danger", "DangerButton"),
    ("btn-negative", "NegativeButton"),
    ("btn-back", "BackButton"),
    ("btn-cancel", "CancelButton"),
    ("btn-sm", "SmallButton"),
    ("btn-label", "ButtonLabel"),
    ("button-group", "ButtonGroup"),
    ("toggle-button", "ToggleButton"),
    ("toggle-button-group", "ToggleButtonGroup"),
    // Forms
    ("form-group", "FormGroup"),
    ("doc-input", "DocInput"),
    ("async-form", "AsyncForm"),
    ("filter-select", "FilterSelect"),
    ("checkbox-container", "CheckboxContainer"),
    ("checkbox-item", "CheckboxItem"),
    ("checkbox-grid", "CheckboxGrid"),
    ("mapping-field-select", "MappingFieldSelect"),
    ("mapping-field-label", "MappingFieldLabel"),
    ("mapping-field-group", "MappingFieldGroup"),
    // Modal structure
    ("modal-header", "ModalHeader"),
    ("modal-content", "ModalContent"),
    ("modal-footer", "ModalFooter"),
    ("modal-close", "ModalClose"),
    ("modal-overlay", "ModalOverlay"),
    ("overlay", "Overlay"),
    // Status and loading
    ("status-indicator", "StatusIndicator"),
    ("status-container", "StatusContainer"),
    ("status-icon", "StatusIcon"),
    ("loading-indicator", "LoadingIndicator"),
    ("loading-placeholder", "LoadingPlaceholder"),
    ("error-placeholder", "ErrorPlaceholder"),
    ("progress-bar", "ProgressBar"),
    ("progress-container", "ProgressContainer"),
    ("progress-stats", "ProgressStats"),
    ("manual-loading-overlay", "ManualLoadingOverlay"),
    // Icons
    ("fas", "FontAwesomeIcon"),
    ("fa-spinner", "LoadingSpinner"),
    ("fa-spin", "SpinAnimation"),
    ("info-icon", "InfoIcon"),
    ("warning-icon", "WarningIcon"),
    ("success-icon", "SuccessIcon"),
    // Dropdowns
    ("dropdown", "Dropdown"),
    ("dropdown-header", "DropdownHeader"),
    ("dropdown-content", "DropdownContent"),
    ("dropdown-footer", "DropdownFooter"),
    ("jobs-dropdown", "JobsDropdown"),
    ("notifications-dropdown", "NotificationsDropdown"),
    // Stages
    ("stage-form", "StageForm"),
    ("stage-form-rfp-question-import", "StageFormRfpQuestionImport"),
    ("stage-form-rfp-answer-questions", "StageFormRfpAnswerQuestions"),
    ("stage-form-rfp-initial-review", "StageFormAnalysisLMInitialReview"),
    ("stage-title", "StageTitle"),
    ("stage-description", "StageDescription"),
    ("stage-number", "StageNumber"),
    ("stage-separator", "StageSeparator"),
    // Grids
    ("questions-grid", "QuestionsGrid"),
    ("ag-overlay-loading-center", "AgGridLoadingOverlay"),
    ("ag-overlay-no-rows-center", "AgGridNoRowsOverlay"),
    // Tabs
    ("topic-tabs", "TopicTabs"),
    ("tab-loading-indicator", "TabLoadingIndicator"),
    ("worksheet-tabs-container", "WorksheetTabsContainer"),
    // Panes
    ("control-pane", "ControlPane"),
    ("filter-pane", "FilterPane"),
    ("sub-pane", "SubPane"),
    // Documents
    ("doc-container", "DocumentContainer"),
    ("doc-stage-breadcrumb", "DocumentStageBreadcrumb"),
    ("doc-stage-content-wrapper", "DocumentStageContentWrapper"),
    ("doc-title", "DocumentTitle"),
    ("doc-header", "DocumentHeader"),
    ("doc-footer", "DocumentFooter"),
    ("doc-main-content", "DocumentMainContent"),
    ("breadcrumb-label", "BreadcrumbLabel"),
    // Import wizard
    ("import-step", "ImportStep"),
    ("import-step-select-file", "ImportStepSelectFile"),
    ("import-step-map-columns", "ImportStepMapColumns"),
    ("import-step-preview", "ImportStepPreview"),
    ("import-step-results", "ImportStepResults"),
    ("import-step-confirm", "ImportStepConfirm"),
    ("import-grid-container", "ImportGridContainer"),
    ("import-wizard-content", "ImportWizardContent"),
    ("import-status-container", "ImportStatusContainer"),
    ("import-progress-section", "ImportProgressSection"),
    ("import-note", "ImportNote"),
    ("drag-drop-area", "DragDropArea"),
    // Mapping
    ("mapping-container", "MappingContainer"),
    ("mapping-section", "MappingSection"),
    ("mapping-instructions", "MappingInstructions"),
    ("mapping-form", "MappingForm"),
    ("mapping-item", "MappingItem"),
    ("mappings-list", "MappingsList"),
    ("include-exclude-toggle", "IncludeExcludeToggle"),
    // Worksheets
    ("worksheet-item", "WorksheetItem"),
    ("worksheet-list", "WorksheetList"),
    ("worksheet-header", "WorksheetHeader"),
    ("worksheet-result-item", "WorksheetResultItem"),
    ("worksheet-results-list", "WorksheetResultsList"),
    ("worksheet-results-section", "WorksheetResultsSection"),
    // Previews
    ("preview-container", "PreviewContainer"),
    ("preview-section", "PreviewSection"),
    ("preview-note", "PreviewNote"),
    ("preview-summary-section", "PreviewSummarySection"),
    ("preview-summary-label", "PreviewSummaryLabel"),
    ("preview-summary-info", "PreviewSummaryInfo"),
    ("no-data-message", "NoDataMessage"),
    ("no-sheets-message", "NoSheetsMessage"),
    // Stats
    ("summary-section", "SummarySection"),
    ("summary-details", "SummaryDetails"),
    ("summary-message", "SummaryMessage"),
    ("results-summary-panel", "ResultsSummaryPanel"),
    ("stat-item", "StatItem"),
    ("stat-label", "StatLabel"),
    ("stat-value", "StatValue"),
    ("stats-container", "StatsContainer"),
    ("success-stat", "SuccessStat"),
    ("warning-stat", "WarningStat"),
    ("failure-stat", "FailureStat"),
    ("percentage-stat", "PercentageStat"),
    // Framework
    ("selectable-list", "SelectableList"),
    ("selectable-list-container", "SelectableListContainer"),
    ("selectable-list-item", "SelectableListItem"),
    ("analysis-lm-results", "AnalysisLMResults"),
    ("custom-tooltip", "CustomTooltip"),
    ("cell-tooltip", "CellTooltip"),
    // Tables
    ("users-table", "UsersTable"),
    ("jobs-table", "JobsTable"),
    ("accounts-table", "AccountsTable"),
    ("projects-table", "ProjectsTable"),
    ("files-table", "FilesTable"),
    ("top-bar", "TopBar"),
];

const MODAL_VARIANTS: &[(&str, &str)] = &[
    ("account", "AccountModal"),
    ("accounts", "AccountsModal"),
    ("user", "UserModal"),
    ("users", "UsersModal"),
    ("project", "ProjectModal"),
    ("projects", "ProjectsModal"),
    ("document", "DocumentModal"),
    ("documents", "DocumentsModal"),
    ("error", "ErrorModal"),
    ("message", "MessageModal"),
    ("login", "LoginModal"),
    ("register", "RegisterModal"),
    ("password", "PasswordResetModal"),
    ("corpus", "CorpusModal"),
    ("choose-content", "ChooseContentForAIModal"),
    ("text-prompt", "TextPromptModal"),
    ("yesno", "YesNoModal"),
    ("import", "ImportModal"),
    ("jobs", "JobsModal"),
    ("history", "HistoryModal"),
];

const IMPORT_STEP_VARIANTS: &[(&str, &str)] = &[
    ("select-file", "ImportStepSelectFile"),
    ("map-columns", "ImportStepMapColumns"),
    ("preview", "ImportStepPreview"),
    ("confirm", "ImportStepConfirm"),
    ("results", "ImportStepResults"),
];

const STAGE_FORM_VARIANTS: &[(&str, &str)] = &[
    ("rfp-answer-questions", "StageFormRfpAnswerQuestions"),
    ("rfp-initial-review", "StageFormAnalysisLMInitialReview"),
    ("rfp-question-import", "StageFormRfpQuestionImport"),
];

const BUTTON_VARIANTS: &[(&str, &str)] = &[
    ("btn-primary", "PrimaryButton"),
    ("btn-secondary", "SecondaryButton"),
    ("btn-danger", "DangerButton"),
    ("btn-negative", "NegativeButton"),
    ("btn-label", "ButtonLabel"),
];

const DEFAULT_KEYWORDS: &[(&str, &str)] = &[
    ("grid", "Grid"),
    ("pane", "Pane"),
    ("tab", "Tab"),
    ("form", "Form"),
    ("stat", "Stat"),
    ("indicator", "Indicator"),
    ("dropdown", "Dropdown"),
    ("list", "List"),
    ("section", "Section"),
    ("container", "Container"),
    ("item", "Item"),
    ("header", "Header"),
    ("footer", "Footer"),
    ("panel", "Panel"),
    ("label", "Label"),
    ("message", "Message"),
    ("wizard", "Wizard"),
    ("loading", "Loading"),
    ("progress", "Progress"),
    ("overlay", "Overlay"),
    ("doc", "Document"),
    ("status", "Status"),
];

const DEFAULT_PATH_HINTS: &[(&str, &str)] = &[
    ("modals/", "Modal"),
    ("stages/", "Stage"),
    ("components/docitemimport/", "Import"),
    ("framework/", "Framework"),
    ("top-bar/", "TopBar"),
    ("tabs/", "Tab"),
];

/// A family recognised by a fragment of the class name, refined by more
/// specific fragments before falling back to the family label.
#[derive(Debug, Clone)]
pub struct ComponentFamily {
    /// `Infix` families match anywhere in the name; `Prefix` families match the start.
    pub anchor: FamilyAnchor,
    pub marker: String,
    /// Checked in order. Infix variants use containment; prefix variants use equality.
    pub variants: Vec<(String, String)>,
    pub fallback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyAnchor {
    Infix,
    Prefix,
}

impl ComponentFamily {
    fn new(anchor: FamilyAnchor, marker: &str, variants: &[(&str, &str)], fallback: &str) -> Self {
        Self {
            anchor,
            marker: marker.to_string(),
            variants: owned_pairs(variants),
            fallback: fallback.to_string(),
        }
    }

    fn resolve(&self, name: &str) -> Option<String> {
        let hit = match self.anchor {
            FamilyAnchor::Infix => name.contains(&self.marker),
            FamilyAnchor::Prefix => name.starts_with(&self.marker),
        };
        if !hit {
            return None;
        }
        let variant = self.variants.iter().find(|(key, _)| match self.anchor {
            FamilyAnchor::Infix => name.contains(key.as_str()),
            FamilyAnchor::Prefix => name == key,
        });
        Some(
            variant
                .map(|(_, component)| component.clone())
                .unwrap_or_else(|| self.fallback.clone()),
        )
    }
}

/// All lookup tables used by the attribution chain.
#[derive(Debug, Clone)]
pub struct ComponentTables {
    /// Stage 1/4/6 table, in priority order for substring matching.
    pub exact: Vec<(String, String)>,
    /// Stage 2 families.
    pub infix_families: Vec<ComponentFamily>,
    /// Stage 3 families.
    pub prefix_families: Vec<ComponentFamily>,
    /// Stage 5 keyword → canonical suffix.
    pub keywords: Vec<(String, String)>,
    /// Stage 7 path fragment → component family.
    pub path_hints: Vec<(String, String)>,
}

impl Default for ComponentTables {
    fn default() -> Self {
        Self {
            exact: owned_pairs(DEFAULT_EXACT),
            infix_families: vec![
                ComponentFamily::new(FamilyAnchor::Infix, "modal", MODAL_VARIANTS, "Modal"),
                ComponentFamily::new(
                    FamilyAnchor::Infix,
                    "import-step",
                    IMPORT_STEP_VARIANTS,
                    "ImportStep",
                ),
                ComponentFamily::new(
                    FamilyAnchor::Infix,
                    "stage-form",
                    STAGE_FORM_VARIANTS,
                    "StageForm",
                ),
            ],
            prefix_families: vec![ComponentFamily::new(
                FamilyAnchor::Prefix,
                "btn",
                BUTTON_VARIANTS,
                "Button",
            )],
            keywords: owned_pairs(DEFAULT_KEYWORDS),
            path_hints: owned_pairs(DEFAULT_PATH_HINTS),
        }
    }
}

impl ComponentTables {
    /// Default tables extended with entries from `cssmig.toml`.
    pub fn from_config(config: Option<&CssmigConfig>) -> Self {
        let mut tables = Self::default();
        if let Some(components) = config.and_then(|c| c.components.as_ref()) {
            if let Some(exact) = &components.exact {
                tables
                    .exact
                    .extend(exact.iter().map(|(k, v)| (k.to_lowercase(), v.clone())));
            }
            if let Some(hints) = &components.path_hints {
                tables
                    .path_hints
                    .extend(hints.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        tables
    }
}

fn owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Runs the attribution chain over a fixed set of tables.
#[derive(Debug, Clone, Default)]
pub struct ComponentAttributor {
    tables: ComponentTables,
}

impl ComponentAttributor {
    pub fn new(tables: ComponentTables) -> Self {
        Self { tables }
    }

    /// Best-guess owning component for `class_name`.
    pub fn attribute(&self, class_name: &str, selectors: &BTreeSet<String>) -> String {
        let name = class_name.to_lowercase();

        self.exact_match(&name)
            .or_else(|| self.family_match(&self.tables.infix_families, &name))
            .or_else(|| self.family_match(&self.tables.prefix_families, &name))
            .or_else(|| self.substring_match(&name))
            .or_else(|| self.keyword_match(&name))
            .or_else(|| self.selector_match(selectors))
            .or_else(|| self.path_hint_match(selectors))
            .unwrap_or_else(|| UNKNOWN_COMPONENT.to_string())
    }

    fn exact_match(&self, name: &str) -> Option<String> {
        self.tables
            .exact
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, component)| component.clone())
    }

    fn family_match(&self, families: &[ComponentFamily], name: &str) -> Option<String> {
        families.iter().find_map(|family| family.resolve(name))
    }

    fn substring_match(&self, name: &str) -> Option<String> {
        self.tables
            .exact
            .iter()
            .find(|(key, _)| name.contains(key.as_str()))
            .map(|(_, component)| component.clone())
    }

    fn keyword_match(&self, name: &str) -> Option<String> {
        let (_, suffix) = self
            .tables
            .keywords
            .iter()
            .find(|(keyword, _)| name.contains(keyword.as_str()))?;

        // Only dashes separate words; underscores and inner capitals stay in the word.
        let words: Vec<&str> = name.split('-').filter(|w| !w.is_empty()).collect();
        if words.len() > 1 {
            Some(words.into_iter().map(capitalize).collect())
        } else {
            Some(format!("{}{}", capitalize(name), suffix))
        }
    }

    fn selector_match(&self, selectors: &BTreeSet<String>) -> Option<String> {
        selectors.iter().find_map(|selector| {
            let selector = selector.to_lowercase();
            self.tables
                .exact
                .iter()
                .find(|(key, _)| selector.contains(key.as_str()))
                .map(|(_, component)| component.clone())
        })
    }

    fn path_hint_match(&self, selectors: &BTreeSet<String>) -> Option<String> {
        selectors.iter().find_map(|selector| {
            self.tables
                .path_hints
                .iter()
                .find(|(fragment, _)| selector.contains(fragment.as_str()))
                .map(|(_, family)| family.clone())
        })
    }
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
