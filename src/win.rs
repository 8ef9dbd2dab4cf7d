use crate::dice::Die;

/// True when every die is held and all show the same face. No dice is no win.
pub fn check_win(dice: &[Die]) -> bool {
    let Some(first) = dice.first() else {
        return false;
    };
    dice.iter()
        .all(|die| die.is_held && die.value == first.value)
}
