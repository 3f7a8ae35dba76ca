use super::filters::{compose, is_image_format};
use crate::options::{OptionSet, OutputTarget};
use crate::queue::Job;
use std::path::{Component, Path, PathBuf};

/// Build the job (output path and ffmpeg arguments) for one input file
pub fn build_job(options: &OptionSet, raw_input: &Path) -> Job {
    let input = clean_path(raw_input);
    let output = output_path(options, &input);

    let image_output = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(is_image_format);

    let mut args = global_flags(options);
    args.extend(["-i".to_string(), input.to_string_lossy().to_string()]);
    args.extend(compose(options, image_output).to_args());
    args.push(output.to_string_lossy().to_string());

    Job {
        input,
        output,
        args,
    }
}

fn global_flags(options: &OptionSet) -> Vec<String> {
    let mut flags = Vec::new();
    if options.force {
        flags.push("-y".to_string());
    }
    flags
}

/// Resolve where the converted input is written
pub fn output_path(options: &OptionSet, input: &Path) -> PathBuf {
    let format = options.format.as_deref();
    match &options.output {
        OutputTarget::Directory(dir) => match base_name(input) {
            Some(name) => dir.join(set_file_format(name, format)),
            None => dir.clone(),
        },
        OutputTarget::File(file) => file.clone(),
        OutputTarget::Unchanged => set_file_format(input, format),
    }
}

/// Last path element, keeping a trailing `..`; `None` for `/` and `.`
fn base_name(path: &Path) -> Option<&Path> {
    match path.components().next_back()? {
        Component::Normal(name) => Some(Path::new(name)),
        Component::ParentDir => Some(Path::new("..")),
        _ => None,
    }
}

fn set_file_format(file: &Path, format: Option<&str>) -> PathBuf {
    match format {
        Some(format) => file.with_extension(format),
        None => file.to_path_buf(),
    }
}

/// Lexically normalise a path: drop `.` segments and fold `..` where possible.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.last() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => cleaned.push(component),
            },
            other => cleaned.push(other),
        }
    }

    if cleaned.is_empty() {
        return PathBuf::from(".");
    }
    cleaned.iter().collect()
}
