/// A member of a library archive, identified by its name and the byte
/// range of its embedded object file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveMember<'a> {
    pub name: &'a str,
    pub object_bytes: &'a [u8],
}

/// Interface to an external library (archive) reader.
///
/// §6 specifies the archive container only up to its interface with the
/// object model: a Unix `!<arch>\n` file with 60-byte member headers, a
/// leading `/SYMDEF SORTED/` member holding a sorted symbol directory, and
/// a `//` member holding long names. Parsing that container is out of
/// scope here; this crate only needs to iterate members and hand each one
/// to [`crate::object::ObjectFile`] as a byte range.
pub trait LibraryArchiveReader {
    type Iter<'a>: Iterator<Item = ArchiveMember<'a>>
    where
        Self: 'a;

    fn members(&self) -> Self::Iter<'_>;

    fn find_member<'a>(&'a self, name: &str) -> Option<ArchiveMember<'a>> {
        self.members().find(|member| member.name == name)
    }
}
