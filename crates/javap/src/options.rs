use jdis_class_file::AccessFlags;

/// Which members are shown, from least to most permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AccessLevel {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}
impl AccessLevel {
    pub fn allows(self, flags: AccessFlags) -> bool {
        match self {
            AccessLevel::Public => flags.contains(AccessFlags::PUBLIC),
            AccessLevel::Protected => {
                flags.intersects(AccessFlags::PUBLIC | AccessFlags::PROTECTED)
            }
            AccessLevel::Package => !flags.contains(AccessFlags::PRIVATE),
            AccessLevel::Private => true,
        }
    }
}

/// Selects the sections of the disassembly.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub show_line_and_local: bool,
    pub access_level: AccessLevel,
    pub show_disassembled: bool,
    pub show_verbose: bool,
    pub show_internal_sigs: bool,
    pub show_all_attributes: bool,
}
impl Options {
    /// Everything `-verbose` turns on.
    pub fn verbose() -> Self {
        Self {
            show_line_and_local: true,
            show_disassembled: true,
            show_verbose: true,
            show_internal_sigs: true,
            ..Self::default()
        }
    }

    pub(crate) fn shows_code(&self) -> bool {
        self.show_disassembled || self.show_verbose
    }

    pub(crate) fn shows_line_and_local(&self) -> bool {
        self.show_line_and_local || self.show_verbose
    }

    pub(crate) fn shows_internal_sigs(&self) -> bool {
        self.show_internal_sigs || self.show_verbose
    }
}
