use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "flowctl")]
#[command(about = "Command line client for the workflow engine")]
#[command(long_about = "flowctl drives process definitions, deployments, instances, tasks, decisions \
                       and forms through the engine REST API. Lifecycle commands (suspend, activate, \
                       terminate, claim, unclaim, complete) re-fetch the entity and report the state \
                       the engine actually reached.")]
pub struct Cli {
    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Override engine.base_url from configuration
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process definitions
    #[command(subcommand)]
    Definitions(DefinitionAction),
    /// Deployments of BPMN, DMN and form resources
    #[command(subcommand)]
    Deployments(DeploymentAction),
    /// Process instances and their lifecycle
    #[command(subcommand)]
    Instances(InstanceAction),
    /// User tasks: inbox, claim, complete
    #[command(subcommand)]
    Tasks(TaskAction),
    /// DMN decisions
    #[command(subcommand)]
    Decisions(DecisionAction),
    /// Form definitions and submissions
    #[command(subcommand)]
    Forms(FormAction),
    /// User administration
    #[command(subcommand)]
    Users(UserAction),
    /// Check engine health
    Health,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    pub page: u32,
    /// Page size
    #[arg(long, default_value_t = 20)]
    pub size: u32,
}

/// Variables given inline or from a JSON file.
#[derive(Args, Debug, Clone, Default)]
pub struct VariableArgs {
    /// Variable as name=value; the value is parsed as JSON when possible
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,
    /// JSON object file with variables
    #[arg(long, value_name = "FILE")]
    pub vars_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum DefinitionAction {
    /// List process definitions
    List {
        #[command(flatten)]
        page: PageArgs,
        /// Only keys containing this text
        #[arg(long)]
        key_like: Option<String>,
        /// Only the latest version of each key
        #[arg(long)]
        latest: bool,
    },
    /// Show one definition
    Get { id: String },
    /// Show the latest definition for a key
    GetByKey { key: String },
    /// Print the BPMN XML of a definition
    Xml { id: String },
    /// Count deployed definitions
    Count,
    /// Start a new instance of the latest definition for a key
    Start {
        key: String,
        #[arg(long)]
        business_key: Option<String>,
        #[command(flatten)]
        variables: VariableArgs,
    },
}

#[derive(Subcommand)]
pub enum DeploymentAction {
    /// List deployments
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one deployment
    Get { id: String },
    /// List the resource names of a deployment
    Resources { id: String },
    /// Count deployments
    Count,
    /// Deploy one or more resource files
    Deploy {
        /// Deployment name
        #[arg(long)]
        name: String,
        /// Resource files (.bpmn, .bpmn20.xml, .dmn, .form, .json)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Send a single BPMN file as a JSON `bpmnXml` body instead of multipart
        #[arg(long)]
        json: bool,
    },
    /// Delete a deployment
    Delete {
        id: String,
        /// Also delete instances of its definitions
        #[arg(long)]
        cascade: bool,
    },
}

#[derive(Subcommand)]
pub enum InstanceAction {
    /// List process instances
    List {
        #[command(flatten)]
        page: PageArgs,
        /// RUNNING, SUSPENDED, COMPLETED or TERMINATED
        #[arg(long)]
        status: Option<String>,
        /// Only instances of definitions whose key contains this text
        #[arg(long)]
        process_key: Option<String>,
    },
    /// Show one instance
    Get { id: String },
    /// Count instances
    Count,
    /// Show instance variables
    Variables { id: String },
    /// Replace instance variables
    SetVariables {
        id: String,
        #[command(flatten)]
        variables: VariableArgs,
    },
    /// Show the activity history of an instance
    History { id: String },
    /// Suspend a running instance
    Suspend { id: String },
    /// Resume a suspended instance
    Activate { id: String },
    /// Terminate an instance
    Terminate {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Query tasks
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        candidate_user: Option<String>,
        #[arg(long)]
        process_instance_id: Option<String>,
        #[arg(long)]
        name_like: Option<String>,
        /// Only unassigned tasks
        #[arg(long)]
        unassigned: bool,
    },
    /// Tasks assigned to the caller
    Inbox {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Unassigned tasks the caller may claim
    Claimable {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one task
    Get { id: String },
    /// Show task variables
    Variables { id: String },
    /// Replace task-local variables
    SetVariables {
        id: String,
        #[command(flatten)]
        variables: VariableArgs,
    },
    /// Claim a task for the caller
    Claim { id: String },
    /// Give a claimed task back
    Unclaim { id: String },
    /// Complete a claimed task
    Complete {
        id: String,
        #[command(flatten)]
        variables: VariableArgs,
    },
    /// List comments on a task
    Comments { id: String },
    /// Add a comment to a task
    Comment { id: String, message: String },
    /// List attachments of a task
    Attachments { id: String },
    /// Upload a file as a task attachment
    Attach { id: String, file: PathBuf },
}

#[derive(Subcommand)]
pub enum DecisionAction {
    /// List decisions
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one decision
    Get { id: String },
    /// Show the latest decision for a key
    GetByKey { key: String },
    /// Print the DMN XML of a decision
    Xml { id: String },
    /// Deploy a DMN file
    Deploy {
        file: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a decision deployment
    DeleteDeployment { deployment_id: String },
    /// Evaluate the latest decision for a key
    Execute {
        key: String,
        #[command(flatten)]
        variables: VariableArgs,
    },
    /// Validate a DMN file without deploying it
    Validate { file: PathBuf },
}

#[derive(Subcommand)]
pub enum FormAction {
    /// List forms
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one form
    Get { id: String },
    /// List every version of a form key
    GetByKey { key: String },
    /// Show the latest version of a form key
    Latest { key: String },
    /// Show the form of a task
    ForTask { task_id: String },
    /// Create a form from a JSON schema file
    Create {
        #[arg(long)]
        key: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        schema: PathBuf,
    },
    /// Replace a form's schema
    Update {
        id: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        schema: PathBuf,
    },
    /// Delete a form
    Delete { id: String },
    /// Publish a form as a new version
    Publish { id: String },
    /// Submit data for a form
    Submit {
        id: String,
        #[command(flatten)]
        data: VariableArgs,
    },
    /// Validate data against a form
    Validate {
        id: String,
        #[command(flatten)]
        data: VariableArgs,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// List users
    List {
        #[command(flatten)]
        page: PageArgs,
        /// Match on username or email
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one user
    Get { id: String },
    /// Create a user
    Create {
        username: String,
        #[arg(long)]
        email: String,
        /// Initial password (read from FLOWCTL_NEW_USER_PASSWORD when omitted)
        #[arg(long, env = "FLOWCTL_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long = "role")]
        roles: Vec<String>,
    },
    /// Update a user's email, roles or status
    Update {
        id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long = "role")]
        roles: Vec<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a user
    Delete { id: String },
}
