//! Virtual address to image offset translation.

/// Translate a virtual address into an offset in the loaded image.
///
/// Zero is not special here: a null pointer must be filtered by the caller
/// before translating, since it would otherwise alias the image start.
/// Returns `None` when `va` lies below the image base.
#[inline]
pub fn translate(va: u32, image_base: u32) -> Option<usize> {
    va.checked_sub(image_base).map(|off| off as usize)
}
