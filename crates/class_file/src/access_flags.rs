use bitflags::bitflags;

bitflags! {
    /// Access and property flags shared by classes, fields, methods and inner classes.
    ///
    /// Several bits mean different things depending on where they appear, so some
    /// constants alias the same value.
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const BRIDGE = 0x0040;
        const TRANSIENT = 0x0080;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

const CLASS_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::ABSTRACT, "abstract"),
];

const INNER_CLASS_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::ABSTRACT, "abstract"),
];

const FIELD_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::VOLATILE, "volatile"),
    (AccessFlags::TRANSIENT, "transient"),
];

const METHOD_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::SYNCHRONIZED, "synchronized"),
    (AccessFlags::NATIVE, "native"),
    (AccessFlags::ABSTRACT, "abstract"),
    (AccessFlags::STRICT, "strictfp"),
];

impl AccessFlags {
    pub fn class_modifiers(self) -> Vec<&'static str> {
        self.modifiers(CLASS_MODIFIERS)
    }

    pub fn inner_class_modifiers(self) -> Vec<&'static str> {
        self.modifiers(INNER_CLASS_MODIFIERS)
    }

    pub fn field_modifiers(self) -> Vec<&'static str> {
        self.modifiers(FIELD_MODIFIERS)
    }

    pub fn method_modifiers(self) -> Vec<&'static str> {
        self.modifiers(METHOD_MODIFIERS)
    }

    /// Neither public, protected nor private.
    pub fn is_package_private(self) -> bool {
        !self.intersects(AccessFlags::PUBLIC | AccessFlags::PROTECTED | AccessFlags::PRIVATE)
    }

    fn modifiers(self, table: &[(AccessFlags, &'static str)]) -> Vec<&'static str> {
        table
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}
