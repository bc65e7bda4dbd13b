use crate::contract::model::User;
use crate::infra::storage::entity::user::Model as UserModel;

impl From<UserModel> for User {
    fn from(m: UserModel) -> Self {
        Self {
            id: m.id,
            name: m.name,
            surname: m.surname,
            username: m.username,
            birthdate: m.birthdate,
        }
    }
}
