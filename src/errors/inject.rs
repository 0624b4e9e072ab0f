use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum InjectErrorKind {
    #[error("No instance of `{}` registered for member `{}` of `{}`", missing.name, member, owner.name)]
    Unresolved {
        owner: TypeInfo,
        member: &'static str,
        missing: TypeInfo,
    },
    #[error("Member `{}` of `{}` has no usable setter", member, owner.name)]
    NotWritable { owner: TypeInfo, member: &'static str },
    #[error("Registered instance for member `{}` of `{}` is not a `{}`", member, owner.name, expected.name)]
    IncorrectType {
        owner: TypeInfo,
        member: &'static str,
        expected: TypeInfo,
    },
}
