use bitflags::bitflags;

// Access flags as they appear in class files and dex files. A few bits
// mean different things depending on what they are attached to.
bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        /// Methods only.
        const SYNCHRONIZED = 0x0020;
        /// Classes only.
        const SUPER = 0x0020;
        /// Fields only.
        const VOLATILE = 0x0040;
        /// Methods only.
        const BRIDGE = 0x0040;
        /// Fields only.
        const TRANSIENT = 0x0080;
        /// Methods only.
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        /// Dex only: instance or class initializer.
        const CONSTRUCTOR = 0x10000;
        /// Dex only: `synchronized` in source but not enforced by the VM.
        const DECLARED_SYNCHRONIZED = 0x20000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagsOf {
    Class,
    Field,
    Method,
}

impl AccessFlags {
    pub const CLASS_FLAGS: AccessFlags = AccessFlags::PUBLIC
        .union(AccessFlags::FINAL)
        .union(AccessFlags::SUPER)
        .union(AccessFlags::INTERFACE)
        .union(AccessFlags::ABSTRACT)
        .union(AccessFlags::SYNTHETIC)
        .union(AccessFlags::ANNOTATION)
        .union(AccessFlags::ENUM);

    pub const INNER_CLASS_FLAGS: AccessFlags = AccessFlags::PUBLIC
        .union(AccessFlags::PRIVATE)
        .union(AccessFlags::PROTECTED)
        .union(AccessFlags::STATIC)
        .union(AccessFlags::FINAL)
        .union(AccessFlags::INTERFACE)
        .union(AccessFlags::ABSTRACT)
        .union(AccessFlags::SYNTHETIC)
        .union(AccessFlags::ANNOTATION)
        .union(AccessFlags::ENUM);

    pub const FIELD_FLAGS: AccessFlags = AccessFlags::PUBLIC
        .union(AccessFlags::PRIVATE)
        .union(AccessFlags::PROTECTED)
        .union(AccessFlags::STATIC)
        .union(AccessFlags::FINAL)
        .union(AccessFlags::VOLATILE)
        .union(AccessFlags::TRANSIENT)
        .union(AccessFlags::SYNTHETIC)
        .union(AccessFlags::ENUM);

    pub const METHOD_FLAGS: AccessFlags = AccessFlags::PUBLIC
        .union(AccessFlags::PRIVATE)
        .union(AccessFlags::PROTECTED)
        .union(AccessFlags::STATIC)
        .union(AccessFlags::FINAL)
        .union(AccessFlags::SYNCHRONIZED)
        .union(AccessFlags::BRIDGE)
        .union(AccessFlags::VARARGS)
        .union(AccessFlags::NATIVE)
        .union(AccessFlags::ABSTRACT)
        .union(AccessFlags::STRICT)
        .union(AccessFlags::SYNTHETIC)
        .union(AccessFlags::CONSTRUCTOR)
        .union(AccessFlags::DECLARED_SYNCHRONIZED);

    /// Renders the flags of a top-level class, e.g. `public|final|super`.
    /// Bits that cannot apply to a class are appended in hex.
    pub fn class_string(self) -> String {
        self.human(AccessFlags::CLASS_FLAGS, FlagsOf::Class)
    }

    pub fn inner_class_string(self) -> String {
        self.human(AccessFlags::INNER_CLASS_FLAGS, FlagsOf::Class)
    }

    pub fn field_string(self) -> String {
        self.human(AccessFlags::FIELD_FLAGS, FlagsOf::Field)
    }

    pub fn method_string(self) -> String {
        self.human(AccessFlags::METHOD_FLAGS, FlagsOf::Method)
    }

    pub fn is_public(self) -> bool {
        self.contains(AccessFlags::PUBLIC)
    }

    pub fn is_private(self) -> bool {
        self.contains(AccessFlags::PRIVATE)
    }

    pub fn is_protected(self) -> bool {
        self.contains(AccessFlags::PROTECTED)
    }

    pub fn is_static(self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(AccessFlags::ABSTRACT)
    }

    pub fn is_native(self) -> bool {
        self.contains(AccessFlags::NATIVE)
    }

    pub fn is_interface(self) -> bool {
        self.contains(AccessFlags::INTERFACE)
    }

    pub fn is_annotation(self) -> bool {
        self.contains(AccessFlags::ANNOTATION)
    }

    pub fn is_enum(self) -> bool {
        self.contains(AccessFlags::ENUM)
    }

    pub fn is_constructor(self) -> bool {
        self.contains(AccessFlags::CONSTRUCTOR)
    }

    pub fn is_synchronized(self) -> bool {
        self.contains(AccessFlags::SYNCHRONIZED)
    }

    pub fn is_declared_synchronized(self) -> bool {
        self.contains(AccessFlags::DECLARED_SYNCHRONIZED)
    }

    fn human(self, mask: AccessFlags, of: FlagsOf) -> String {
        let extra = self.bits() & !mask.bits();
        let flags = self & mask;

        let shared = match of {
            FlagsOf::Class => "super",
            FlagsOf::Field | FlagsOf::Method => "synchronized",
        };
        let (x40, x80) = match of {
            FlagsOf::Method => ("bridge", "varargs"),
            FlagsOf::Class | FlagsOf::Field => ("volatile", "transient"),
        };
        let names = [
            (AccessFlags::PUBLIC, "public"),
            (AccessFlags::PRIVATE, "private"),
            (AccessFlags::PROTECTED, "protected"),
            (AccessFlags::STATIC, "static"),
            (AccessFlags::FINAL, "final"),
            (AccessFlags::SYNCHRONIZED, shared),
            (AccessFlags::VOLATILE, x40),
            (AccessFlags::TRANSIENT, x80),
            (AccessFlags::NATIVE, "native"),
            (AccessFlags::INTERFACE, "interface"),
            (AccessFlags::ABSTRACT, "abstract"),
            (AccessFlags::STRICT, "strictfp"),
            (AccessFlags::SYNTHETIC, "synthetic"),
            (AccessFlags::ANNOTATION, "annotation"),
            (AccessFlags::ENUM, "enum"),
            (AccessFlags::CONSTRUCTOR, "constructor"),
            (AccessFlags::DECLARED_SYNCHRONIZED, "declared_synchronized"),
        ];

        let mut parts: Vec<String> = names
            .iter()
            .filter(|(flag, _)| flags.contains(*flag))
            .map(|(_, name)| name.to_string())
            .collect();
        if extra != 0 || parts.is_empty() {
            parts.push(format!("{:04x}", extra));
        }
        parts.join("|")
    }
}
