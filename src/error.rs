use thiserror::Error;

/// Fatal queue-construction conditions. Building aborts on the first of
/// these; no partial pipeline is ever returned. Rejections and the stop
/// signal are engine-internal control flow and never appear here.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("script {script} line {line}: unknown method {name}")]
    UnknownMethod {
        name: String,
        script: u32,
        line: u32,
    },

    #[error("script {script} line {line}: {method}: no argument found for `{description}'")]
    MissingArgument {
        method: String,
        description: String,
        script: u32,
        line: u32,
    },

    #[error("script {script} line {line}: {method}: error setting up option -{option}")]
    OptionError {
        method: String,
        option: String,
        script: u32,
        line: u32,
    },

    #[error("script {script} line {line}: {method}: required argument to option `{description}' is missing")]
    MissingCompanion {
        method: String,
        description: String,
        script: u32,
        line: u32,
    },

    #[error("script {script} line {line}: {method}: too many arguments")]
    TooManyArguments {
        method: String,
        script: u32,
        line: u32,
    },

    #[error("script {script} line {line}: {method}: {message}")]
    Syntax {
        method: String,
        message: String,
        script: u32,
        line: u32,
    },

    #[error("script {script} line {line}: multiple 'Post:' lines not allowed")]
    DuplicatePost { script: u32, line: u32 },

    #[error("script {script} line {line}: {method}: the first method in the iterated queue must be an epoch source")]
    FirstNotSource {
        method: String,
        script: u32,
        line: u32,
    },

    #[error("script {script} line {line}: {method}: an epoch source is only allowed as one of the first methods of the iterated queue")]
    MisplacedGetEpoch {
        method: String,
        script: u32,
        line: u32,
    },

    #[error("script {script} line {line}: {method}: a branch must directly follow an epoch source")]
    MisplacedBranch {
        method: String,
        script: u32,
        line: u32,
    },

    #[error("script {script} line {line}: {method}: only transform methods may be overridden as epoch sources")]
    OverrideNotTransform {
        method: String,
        script: u32,
        line: u32,
    },

    #[error("script {script} line {line}: {method}: collect methods cannot be branch-marked")]
    BranchedCollect {
        method: String,
        script: u32,
        line: u32,
    },

    #[error("script {script} line {line}: {method}: multiple collect methods in the iterated queue")]
    MultipleCollect {
        method: String,
        script: u32,
        line: u32,
    },

    #[error("script {script} line {line}: {method}: collect methods are not allowed in the post-processing queue")]
    CollectInPost {
        method: String,
        script: u32,
        line: u32,
    },

    #[error("script {script}: the iterated queue must be closed with a collect method{}", if *.hint { " - did you forget the Post: keyword?" } else { "" })]
    MissingCollect { script: u32, hint: bool },

    #[error("arguments up to ${requested} were requested by the script, but only {supplied} were given")]
    MissingVariables { requested: usize, supplied: usize },

    #[error("variable value >{value}< not accepted for `{description}'")]
    VariableBind { value: String, description: String },

    #[error("dump mismatch for method {name}: {message}")]
    DumpMismatch { name: String, message: String },
}
