mod class_path;

use std::{ffi::OsString, fs::File, path::Path, process};

use anyhow::{Context, Result};
use clap::Parser;
use jdis_class_file::ClassFile;
use jdis_javap::{AccessLevel, Disassembly, Options};
use memmap::Mmap;

use class_path::ClassPath;

#[derive(Parser)]
#[command(name = "jdis")]
#[command(about = "Disassembles JVM class files")]
#[command(version)]
struct Cli {
    /// Print line number and local variable tables
    #[arg(short = 'l')]
    line_and_local: bool,

    /// Show only public classes and members
    #[arg(long)]
    public: bool,

    /// Show protected and public classes and members
    #[arg(long)]
    protected: bool,

    /// Show package, protected and public classes and members (default)
    #[arg(long)]
    package: bool,

    /// Show all classes and members
    #[arg(short, long)]
    private: bool,

    /// Disassemble the code
    #[arg(short = 'c')]
    disassemble: bool,

    /// Print internal type signatures
    #[arg(short = 's')]
    internal_sigs: bool,

    /// Print stack size, number of locals and arguments for methods, and the constant pool
    #[arg(short, long)]
    verbose: bool,

    /// Print attributes that are not otherwise understood
    #[arg(long)]
    all: bool,

    /// Where to find user class files
    #[arg(long, visible_alias = "cp", value_name = "PATH")]
    classpath: Option<OsString>,

    /// Override location of bootstrap class files
    #[arg(long, value_name = "PATH")]
    bootclasspath: Option<OsString>,

    /// Override location of installed extensions
    #[arg(long, value_name = "DIRS")]
    extdirs: Option<OsString>,

    /// Class names or .class files
    #[arg(required = true, value_name = "CLASS")]
    classes: Vec<String>,
}

impl Cli {
    fn options(&self) -> Options {
        let mut options = if self.verbose {
            Options::verbose()
        } else {
            Options::default()
        };
        options.show_line_and_local |= self.line_and_local;
        options.show_disassembled |= self.disassemble;
        options.show_internal_sigs |= self.internal_sigs;
        options.show_all_attributes = self.all;
        // The widest requested level wins.
        options.access_level = if self.private {
            AccessLevel::Private
        } else if self.package {
            AccessLevel::Package
        } else if self.protected {
            AccessLevel::Protected
        } else if self.public {
            AccessLevel::Public
        } else {
            AccessLevel::default()
        };
        options
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let options = cli.options();
    let class_path = ClassPath::new(
        cli.bootclasspath.as_deref(),
        cli.extdirs.as_deref(),
        cli.classpath.as_deref(),
    );

    let mut failed = false;
    for class in &cli.classes {
        let Some(path) = class_path.find(class) else {
            eprintln!("ERROR:Could not find {}", class);
            failed = true;
            continue;
        };

        match read_class(&path) {
            Ok(class_file) => print!("{}", Disassembly::new(&class_file, &options)),
            Err(err) => {
                eprintln!("error: {}: {:#}", path.display(), err);
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
    Ok(())
}

fn read_class(path: &Path) -> Result<ClassFile> {
    log::debug!("reading {}", path.display());
    let file = File::open(path).context("could not open file")?;
    if file.metadata()?.len() == 0 {
        // Empty files cannot be mapped.
        return Ok(ClassFile::parse(&[])?);
    }

    let mmap = unsafe { Mmap::map(&file) }.context("could not map file")?;
    Ok(ClassFile::parse(&mmap)?)
}
