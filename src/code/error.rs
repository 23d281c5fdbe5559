use std::fmt;

#[macro_export]
macro_rules! err {
    ($kind:ident, $msg:literal) => {
        $crate::code::error::RopError::new($crate::code::error::RopErrorKind::$kind, $msg)
    };
    ($kind:ident, $fmtstr:literal, $($args:tt)*) => {
        $crate::code::error::RopError::new(
            $crate::code::error::RopErrorKind::$kind,
            &format!($fmtstr, $($args)*),
        )
    };
}

#[macro_export]
macro_rules! fail {
    ($kind:ident, $msg:literal) => {
        return Err($crate::err!($kind, $msg))
    };
    ($kind:ident, $fmtstr:literal, $($args:tt)*) => {
        return Err($crate::err!($kind, $fmtstr, $($args)*))
    };
}

/// Broad classification of a [`RopError`].
///
/// None of these are transient: every one of them means the caller (or the
/// front-end that produced its input) handed the IR something it cannot
/// represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RopErrorKind
{
    /// A construction invariant was violated or no typed rop exists for
    /// the requested opcode/type combination.
    InvalidArgument,
    /// A required value was missing.
    NullArgument,
    /// The operation is meaningless for this kind of value.
    UnsupportedOperation,
    /// A signature-polymorphic method name outside the recognized table.
    UnknownMethod,
    /// A label lookup that matched no block.
    NoSuchBlock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RopError
{
    kind: RopErrorKind,
    msg: String,
    contexts: Vec<String>,
}

impl RopError
{
    pub fn new(kind: RopErrorKind, msg: &str) -> Self
    {
        RopError {
            kind,
            msg: msg.to_string(),
            contexts: Vec::new(),
        }
    }

    pub fn with_context(base: RopError, context: String) -> Self
    {
        let mut contexts = base.contexts;
        contexts.push(context);
        RopError { kind: base.kind, msg: base.msg, contexts }
    }

    pub fn kind(&self) -> RopErrorKind
    {
        self.kind
    }

    pub fn message(&self) -> &str
    {
        &self.msg
    }
}

impl fmt::Display for RopError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.msg)?;
        let mut connector = " for ";
        for context in &self.contexts
        {
            write!(f, "{}{}", connector, context)?;
            connector = " of ";
        }
        Ok(())
    }
}

impl std::error::Error for RopError {}

#[cfg(test)]
mod tests
{
    use super::*;

    fn rejects(n: i32) -> Result<i32, RopError>
    {
        if n < 0
        {
            fail!(InvalidArgument, "reg < 0: {}", n);
        }
        Ok(n)
    }

    #[test]
    fn fail_returns_kind_and_message()
    {
        let e = rejects(-1).unwrap_err();
        assert_eq!(e.kind(), RopErrorKind::InvalidArgument);
        assert_eq!(e.message(), "reg < 0: -1");
        assert_eq!(rejects(3), Ok(3));
    }

    #[test]
    fn contexts_chain_in_display()
    {
        let base = err!(UnsupportedOperation, "unsupported");
        let e = RopError::with_context(base, "fill-array-data".to_string());
        let e = RopError::with_context(e, "block 0004".to_string());
        assert_eq!(e.to_string(), "unsupported for fill-array-data of block 0004");
        assert_eq!(e.kind(), RopErrorKind::UnsupportedOperation);
    }
}
