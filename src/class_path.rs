use std::{
    env,
    ffi::OsStr,
    path::{Path, PathBuf},
};

use log::{debug, trace};

/// Directories searched for classes, in order: boot class path, extension
/// directories, user class path, then the current directory.
#[derive(Debug)]
pub struct ClassPath {
    dirs: Vec<PathBuf>,
}
impl ClassPath {
    /// Each argument is a platform path list. Without a user class path the
    /// `CLASSPATH` environment variable is used.
    pub fn new(boot: Option<&OsStr>, ext_dirs: Option<&OsStr>, user: Option<&OsStr>) -> Self {
        let user = user.map(OsStr::to_os_string).or_else(|| env::var_os("CLASSPATH"));

        let mut dirs = Vec::new();
        for paths in [boot, ext_dirs, user.as_deref()].into_iter().flatten() {
            dirs.extend(env::split_paths(paths).filter(|p| !p.as_os_str().is_empty()));
        }
        dirs.push(PathBuf::from("."));
        debug!("class path: {:?}", dirs);

        Self { dirs }
    }

    /// Resolves a class argument to a file. Arguments ending in `.class`
    /// or naming an existing file are used as is; anything else is a class
    /// name such as `java.lang.Object`.
    pub fn find(&self, class: &str) -> Option<PathBuf> {
        let path = Path::new(class);
        if class.ends_with(".class") || path.is_file() {
            return path.is_file().then(|| path.to_path_buf());
        }

        let relative = format!("{}.class", class.replace('.', "/"));
        self.dirs.iter().map(|dir| dir.join(&relative)).find(|candidate| {
            trace!("looking for {} in {}", class, candidate.display());
            candidate.is_file()
        })
    }
}

#[cfg(test)]
mod class_path_tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn scratch_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("my")).unwrap();
        dir
    }

    #[test]
    fn it_should_find_classes_by_dotted_name() {
        let dir = scratch_dir();
        fs::write(dir.path().join("my/MyClass.class"), b"\xCA\xFE\xBA\xBE").unwrap();

        let class_path = ClassPath::new(None, None, Some(dir.path().as_os_str()));
        assert_eq!(
            class_path.find("my.MyClass"),
            Some(dir.path().join("my/MyClass.class"))
        );
        assert_eq!(class_path.find("my.Missing"), None);
    }

    #[test]
    fn it_should_prefer_the_boot_class_path() {
        let boot = scratch_dir();
        let user = scratch_dir();
        for dir in [&boot, &user] {
            fs::write(dir.path().join("my/Shadowed.class"), b"").unwrap();
        }

        let class_path = ClassPath::new(
            Some(boot.path().as_os_str()),
            None,
            Some(user.path().as_os_str()),
        );
        assert_eq!(
            class_path.find("my.Shadowed"),
            Some(boot.path().join("my/Shadowed.class"))
        );
    }

    #[test]
    fn it_should_search_extension_dirs_before_the_user_class_path() {
        let ext = scratch_dir();
        let user = scratch_dir();
        fs::write(ext.path().join("my/Ext.class"), b"").unwrap();
        fs::write(user.path().join("my/Ext.class"), b"").unwrap();
        fs::write(user.path().join("my/User.class"), b"").unwrap();

        let class_path = ClassPath::new(
            None,
            Some(ext.path().as_os_str()),
            Some(user.path().as_os_str()),
        );
        assert_eq!(class_path.find("my.Ext"), Some(ext.path().join("my/Ext.class")));
        assert_eq!(class_path.find("my.User"), Some(user.path().join("my/User.class")));
    }

    #[test]
    fn it_should_use_class_file_arguments_directly() {
        let dir = scratch_dir();
        let file = dir.path().join("my/Direct.class");
        fs::write(&file, b"").unwrap();

        let class_path = ClassPath::new(None, None, Some(OsStr::new("")));
        assert_eq!(class_path.find(file.to_str().unwrap()), Some(file.clone()));
        assert_eq!(class_path.find("does/not/Exist.class"), None);
    }
}
